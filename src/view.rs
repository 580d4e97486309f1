//! Live macroquad preview of a background, drawn tile by tile from the
//! tileset texture so repaints show up without re-compositing.

use std::borrow::Cow;

use image::{imageops, RgbaImage};
use macroquad::prelude::*;

use crate::background::Background;
use crate::tileset::{Tileset, EMPTY_TILE};

pub struct BackgroundView {
    tex: Texture2D,
    tileset: Tileset,
}

impl BackgroundView {
    /// Upload the tileset's source image as a nearest-filtered texture.
    /// Images wider or taller than `u16::MAX` pixels are not supported by the
    /// texture API; only their top-left `u16::MAX` square is uploaded.
    pub fn new(tileset: Tileset, source: &RgbaImage) -> Self {
        let pixels = texture_pixels(source);
        // both sides fit in u16 after texture_pixels
        let (w, h) = (pixels.width() as u16, pixels.height() as u16);
        let tex = Texture2D::from_rgba8(w, h, pixels.as_raw());
        tex.set_filter(FilterMode::Nearest);
        BackgroundView { tex, tileset }
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    fn cell_size(&self, scale: f32) -> Vec2 {
        vec2(
            self.tileset.tile_width as f32 * scale,
            self.tileset.tile_height as f32 * scale,
        )
    }

    /// Draw the visible layers bottom to top with the grid's top-left at
    /// `origin`.
    pub fn draw(&self, bg: &Background, origin: Vec2, scale: f32) {
        let cell = self.cell_size(scale);
        for layer in bg.layers.iter().filter(|l| l.visible) {
            for (x, y, tile) in layer.data.iter() {
                if tile == EMPTY_TILE {
                    continue;
                }
                let Some(r) = self.tileset.tile_rect(tile) else {
                    continue;
                };
                draw_texture_ex(
                    &self.tex,
                    origin.x + x as f32 * cell.x,
                    origin.y + y as f32 * cell.y,
                    WHITE,
                    DrawTextureParams {
                        source: Some(Rect::new(r.x as f32, r.y as f32, r.w as f32, r.h as f32)),
                        dest_size: Some(cell),
                        ..Default::default()
                    },
                );
            }
        }
    }

    pub fn draw_grid(&self, bg: &Background, origin: Vec2, scale: f32, color: Color) {
        let cell = self.cell_size(scale);
        let size = vec2(bg.width as f32 * cell.x, bg.height as f32 * cell.y);
        for x in 0..=bg.width {
            let px = origin.x + x as f32 * cell.x;
            draw_line(px, origin.y, px, origin.y + size.y, 1.0, color);
        }
        for y in 0..=bg.height {
            let py = origin.y + y as f32 * cell.y;
            draw_line(origin.x, py, origin.x + size.x, py, 1.0, color);
        }
    }

    /// Draw the whole tileset image as a palette and return the tile index
    /// under `cursor`, if any.
    pub fn draw_palette(&self, origin: Vec2, scale: f32, cursor: Vec2) -> Option<u32> {
        let size = vec2(self.tex.width() * scale, self.tex.height() * scale);
        draw_texture_ex(
            &self.tex,
            origin.x,
            origin.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(size),
                ..Default::default()
            },
        );
        let local = (cursor - origin) / scale;
        let used_w = (self.tileset.columns * self.tileset.tile_width) as f32;
        let used_h = (self.tileset.rows * self.tileset.tile_height) as f32;
        if local.x < 0.0 || local.y < 0.0 || local.x >= used_w || local.y >= used_h {
            return None;
        }
        Some(self.tileset.tile_at_pixel(local.x as u32, local.y as u32))
    }

    /// Grid cell under a screen position. May lie outside the background;
    /// painting there is a no-op.
    pub fn cell_at(&self, origin: Vec2, scale: f32, screen: Vec2) -> (i32, i32) {
        let cell = self.cell_size(scale);
        let local = screen - origin;
        ((local.x / cell.x).floor() as i32, (local.y / cell.y).floor() as i32)
    }
}

/// `source`, cropped to the largest size a texture can take.
fn texture_pixels(source: &RgbaImage) -> Cow<'_, RgbaImage> {
    let max = u32::from(u16::MAX);
    if source.width() <= max && source.height() <= max {
        return Cow::Borrowed(source);
    }
    let (w, h) = (source.width().min(max), source.height().min(max));
    Cow::Owned(imageops::crop_imm(source, 0, 0, w, h).to_image())
}
