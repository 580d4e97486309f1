use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assets::ImageAsset;
use crate::error::{Result, StudioError};

/// Tile index meaning "no tile".
pub const EMPTY_TILE: u32 = 0;

/// A source image cut into a regular grid of tiles, numbered row-major from 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tileset {
    pub id: String,
    pub name: String,
    pub image_id: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub rows: u32,
    pub tile_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Pixel rectangle inside a tileset's source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Tileset {
    /// Partition `image` into `tile_width x tile_height` cells.
    ///
    /// Pixels past the last whole column or row are left unused.
    pub fn partition(
        name: impl Into<String>,
        image: &ImageAsset,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StudioError::Validation("tileset name is required".into()));
        }
        if tile_width == 0 || tile_height == 0 {
            return Err(StudioError::Validation(format!(
                "tile size must be positive, got {tile_width}x{tile_height}"
            )));
        }

        let columns = image.width / tile_width;
        let rows = image.height / tile_height;
        if columns == 0 || rows == 0 {
            return Err(StudioError::Validation(format!(
                "{tile_width}x{tile_height} tiles do not fit in {}x{} image '{}'",
                image.width, image.height, image.name
            )));
        }

        Ok(Tileset {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            image_id: image.id.clone(),
            tile_width,
            tile_height,
            columns,
            rows,
            tile_count: columns * rows,
            created_at: Utc::now(),
        })
    }

    /// Whether `index` can be painted: empty, or one of the tileset's tiles.
    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        index <= self.tile_count
    }

    /// Source rectangle of tile `index`; `None` for the empty tile.
    ///
    /// Indices past `tile_count` still map onto the grid (rows beyond the
    /// image); callers that care check [`Tileset::contains`] first. Indices
    /// whose rectangle would not fit in `u32` pixel space give `None`.
    pub fn tile_rect(&self, index: u32) -> Option<TileRect> {
        if index == EMPTY_TILE || self.columns == 0 {
            return None;
        }
        let local = index - 1;
        let col = local % self.columns;
        let row = local / self.columns;
        let x = col.checked_mul(self.tile_width)?;
        let y = row.checked_mul(self.tile_height)?;
        x.checked_add(self.tile_width)?;
        y.checked_add(self.tile_height)?;
        Some(TileRect {
            x,
            y,
            w: self.tile_width,
            h: self.tile_height,
        })
    }

    /// Tile index under pixel `(px, py)` of the source image.
    ///
    /// Pixels must already be clamped to the image by the caller.
    pub fn tile_at_pixel(&self, px: u32, py: u32) -> u32 {
        let col = px / self.tile_width;
        let row = py / self.tile_height;
        row * self.columns + col + 1
    }
}
