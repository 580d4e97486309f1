//! Raster work: background compositing and sprite-sheet strips.

mod compose;
mod sheet;

pub use compose::composite;
pub use sheet::horizontal_strip;

use std::io::Cursor;

use image::{ImageFormat, ImageReader, RgbaImage};

use crate::error::Result;

/// Decode any supported format into RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Width and height from the image header, without decoding pixels.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    Ok(reader.into_dimensions()?)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
