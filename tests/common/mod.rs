#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use tile_studio::{Background, MemoryStore, Project, Studio, StudioConfig, Tileset};

pub const TILE: u32 = 4;

/// Flat colour of tile `index` in [`tiles_png`].
pub fn tile_color(index: u32) -> Rgba<u8> {
    Rgba([(index * 30) as u8, 200 - (index * 10) as u8, 0, 255])
}

/// `cols x rows` tiles of `TILE` px, tile `i` filled with `tile_color(i)`.
pub fn tiles_image(cols: u32, rows: u32) -> RgbaImage {
    RgbaImage::from_fn(cols * TILE, rows * TILE, |x, y| {
        tile_color((y / TILE) * cols + x / TILE + 1)
    })
}

pub fn png(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn studio() -> Studio {
    studio_with(StudioConfig::default())
}

pub fn studio_with(config: StudioConfig) -> Studio {
    Studio::new(Arc::new(MemoryStore::new()), config)
}

/// A studio that stores any tile index.
pub fn lenient_studio() -> Studio {
    studio_with(StudioConfig {
        strict_tile_indices: false,
        ..StudioConfig::default()
    })
}

/// Game "g" with a 4x2 tileset and a `w x h` background painted with it.
pub fn seeded(studio: &Studio, w: u32, h: u32) -> (Tileset, Background) {
    studio.create_project("g").unwrap();
    let p = studio.project("g");
    let image = p.add_image(Some("tiles"), "tiles.png", &png(&tiles_image(4, 2))).unwrap();
    let tileset = p.create_tileset("terrain", &image.id, TILE, TILE).unwrap();
    let bg = p.create_background("level", w, h, &tileset.id).unwrap();
    (tileset, bg)
}

pub fn project(studio: &Studio) -> Project<'_> {
    studio.project("g")
}
