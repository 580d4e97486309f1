use image::{imageops, RgbaImage};

use crate::error::{Result, StudioError};

/// Lay frames side by side on a transparent strip.
///
/// The frame size comes from the first frame; frame `i` starts at
/// `x = i * frame_width`. Frames are copied, not blended, so translucent
/// pixels keep their alpha. A frame larger than the first is clipped by the
/// sheet edge and overwritten by the frame after it.
pub fn horizontal_strip(frames: &[RgbaImage]) -> Result<RgbaImage> {
    let first = frames
        .first()
        .ok_or_else(|| StudioError::Validation("no valid images provided".into()))?;
    let (fw, fh) = first.dimensions();
    let count = u32::try_from(frames.len())
        .map_err(|_| StudioError::Validation("too many frames".into()))?;

    let mut sheet = RgbaImage::new(fw * count, fh);
    for (i, frame) in frames.iter().enumerate() {
        imageops::replace(&mut sheet, frame, i as i64 * fw as i64, 0);
    }
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn frames_land_in_their_slots() {
        let frames: Vec<_> = (0..3u8)
            .map(|i| RgbaImage::from_pixel(4, 2, Rgba([i * 80, 0, 0, 255])))
            .collect();
        let sheet = horizontal_strip(&frames).unwrap();
        assert_eq!(sheet.dimensions(), (12, 2));
        for i in 0..3u32 {
            assert_eq!(sheet.get_pixel(i * 4, 0)[0], i as u8 * 80);
            assert_eq!(sheet.get_pixel(i * 4 + 3, 1)[0], i as u8 * 80);
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(horizontal_strip(&[]), Err(StudioError::Validation(_))));
    }
}
