use std::collections::HashMap;

use image::{imageops, RgbaImage};

use crate::background::Background;
use crate::error::Result;
use crate::tileset::{Tileset, EMPTY_TILE};

fn cut_tile(tileset: &Tileset, source: &RgbaImage, index: u32) -> Option<RgbaImage> {
    let r = tileset.tile_rect(index)?;
    let fits = |start: u32, len: u32, limit: u32| start.checked_add(len).is_some_and(|end| end <= limit);
    if !fits(r.x, r.w, source.width()) || !fits(r.y, r.h, source.height()) {
        return None;
    }
    Some(imageops::crop_imm(source, r.x, r.y, r.w, r.h).to_image())
}

/// Flatten all visible layers into one raster of
/// `(width * tile_width) x (height * tile_height)` pixels.
///
/// Layers are drawn bottom (index 0) to top with source-over alpha blending
/// onto a transparent canvas. Tiles whose rectangle falls outside `source`
/// are skipped. Fails when the canvas would not fit in `u32` pixels.
pub fn composite(background: &Background, tileset: &Tileset, source: &RgbaImage) -> Result<RgbaImage> {
    let (tw, th) = (tileset.tile_width, tileset.tile_height);
    let (width, height) = background.pixel_size(tileset)?;
    let mut out = RgbaImage::new(width, height);
    let mut tiles: HashMap<u32, Option<RgbaImage>> = HashMap::new();

    for layer in background.layers.iter().filter(|l| l.visible) {
        for (x, y, index) in layer.data.iter() {
            if index == EMPTY_TILE {
                continue;
            }
            let tile = tiles.entry(index).or_insert_with(|| {
                let tile = cut_tile(tileset, source, index);
                if tile.is_none() {
                    log::warn!(
                        "background {}: tile {index} lies outside tileset '{}', skipped",
                        background.id,
                        tileset.name
                    );
                }
                tile
            });
            if let Some(tile) = &*tile {
                imageops::overlay(&mut out, tile, x as i64 * tw as i64, y as i64 * th as i64);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageAsset;
    use chrono::Utc;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    /// 2x1 tiles of 4x4 px: tile 1 red, tile 2 blue.
    fn fixture() -> (Tileset, RgbaImage) {
        let source = RgbaImage::from_fn(8, 4, |x, _| if x < 4 { RED } else { BLUE });
        let img = ImageAsset {
            id: "img".into(),
            name: "tiles".into(),
            filename: "img.png".into(),
            width: 8,
            height: 4,
            created_at: Utc::now(),
        };
        (Tileset::partition("ts", &img, 4, 4).unwrap(), source)
    }

    #[test]
    fn hidden_layers_and_empty_cells_stay_transparent() {
        let (ts, source) = fixture();
        let mut bg = Background::new("bg", 2, 1, &ts).unwrap();
        let base = bg.layers[0].id.clone();
        bg.paint_tile(&base, 0, 0, 1).unwrap();
        let top = bg.add_layer(None).id.clone();
        bg.paint_tile(&top, 1, 0, 2).unwrap();
        bg.toggle_layer_visibility(&top).unwrap();

        let out = composite(&bg, &ts, &source).unwrap();
        assert_eq!(out.dimensions(), (8, 4));
        assert_eq!(out.get_pixel(1, 1), &RED);
        assert_eq!(out.get_pixel(5, 1)[3], 0);
    }

    #[test]
    fn out_of_range_tiles_are_skipped() {
        let (ts, source) = fixture();
        let mut bg = Background::new("bg", 1, 1, &ts).unwrap();
        let id = bg.layers[0].id.clone();
        bg.paint_tile(&id, 0, 0, 9).unwrap();
        let out = composite(&bg, &ts, &source).unwrap();
        assert!(out.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn index_at_u32_max_is_skipped() {
        let (ts, source) = fixture();
        let mut bg = Background::new("bg", 2, 1, &ts).unwrap();
        let id = bg.layers[0].id.clone();
        bg.paint_tile(&id, 0, 0, u32::MAX).unwrap();
        bg.paint_tile(&id, 1, 0, 2).unwrap();
        let out = composite(&bg, &ts, &source).unwrap();
        assert_eq!(out.get_pixel(1, 1)[3], 0);
        assert_eq!(out.get_pixel(5, 1), &BLUE);
    }

    #[test]
    fn translucent_tiles_blend_over() {
        let (ts, _) = fixture();
        let source = RgbaImage::from_fn(8, 4, |x, _| {
            if x < 4 {
                RED
            } else {
                Rgba([0, 0, 255, 0])
            }
        });
        let mut bg = Background::new("bg", 1, 1, &ts).unwrap();
        let base = bg.layers[0].id.clone();
        bg.paint_tile(&base, 0, 0, 1).unwrap();
        let top = bg.add_layer(None).id.clone();
        bg.paint_tile(&top, 0, 0, 2).unwrap();

        // a fully transparent top tile leaves the bottom one visible
        let out = composite(&bg, &ts, &source).unwrap();
        assert_eq!(out.get_pixel(2, 2), &RED);
    }
}
