use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_BACKGROUND_CELLS;
use crate::error::{Result, StudioError};
use crate::grid::Grid;
use crate::raw::RawBackground;
use crate::tileset::{Tileset, EMPTY_TILE};

/// One full-grid array of tile indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub data: Grid<u32>,
}

impl Layer {
    pub fn empty(name: impl Into<String>, width: u32, height: u32) -> Self {
        Layer {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            visible: true,
            data: Grid::new(width, height),
        }
    }
}

/// A tile map: ordered layers over one tileset, bottom layer first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBackground", into = "RawBackground")]
pub struct Background {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tileset_id: String,
    pub layers: Vec<Layer>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// What a single paint call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The cell now holds the new index
    Painted { previous: u32 },
    /// The cell already held the index
    Unchanged,
    /// The coordinates are off the grid
    OutOfBounds,
}

impl PaintOutcome {
    pub fn changed(self) -> bool {
        matches!(self, PaintOutcome::Painted { .. })
    }
}

impl Background {
    /// A `width x height` background with one empty layer named "Layer 1",
    /// limited to [`DEFAULT_MAX_BACKGROUND_CELLS`] cells.
    pub fn new(name: impl Into<String>, width: u32, height: u32, tileset: &Tileset) -> Result<Self> {
        Self::with_cell_limit(name, width, height, tileset, DEFAULT_MAX_BACKGROUND_CELLS)
    }

    /// [`Background::new`] with an explicit cell limit.
    pub fn with_cell_limit(
        name: impl Into<String>,
        width: u32,
        height: u32,
        tileset: &Tileset,
        max_cells: usize,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StudioError::Validation("background name is required".into()));
        }
        check_size(width, height, tileset, max_cells)?;
        Ok(Background {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            width,
            height,
            tileset_id: tileset.id.clone(),
            layers: vec![Layer::empty("Layer 1", width, height)],
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    pub fn layer(&self, layer_id: &str) -> Result<&Layer> {
        self.layers
            .iter()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| StudioError::not_found("layer", layer_id))
    }

    fn layer_mut(&mut self, layer_id: &str) -> Result<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| StudioError::not_found("layer", layer_id))
    }

    /// Write `tile` into one cell of one layer. `EMPTY_TILE` erases.
    ///
    /// Off-grid coordinates and rewrites of the same value are no-ops, which
    /// is what a drag stroke leaving the canvas produces. The index is not
    /// checked against the tileset here.
    pub fn paint_tile(&mut self, layer_id: &str, x: i32, y: i32, tile: u32) -> Result<PaintOutcome> {
        let layer = self.layer_mut(layer_id)?;
        match layer.data.get(x, y) {
            None => Ok(PaintOutcome::OutOfBounds),
            Some(current) if current == tile => Ok(PaintOutcome::Unchanged),
            Some(_) => {
                let previous = layer.data.set(x, y, tile).unwrap_or(EMPTY_TILE);
                Ok(PaintOutcome::Painted { previous })
            }
        }
    }

    /// Append an empty, visible layer on top. Without a name it becomes
    /// "Layer N" where N is the new layer count.
    pub fn add_layer(&mut self, name: Option<String>) -> &Layer {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Layer {}", self.layers.len() + 1));
        self.layers.push(Layer::empty(name, self.width, self.height));
        &self.layers[self.layers.len() - 1]
    }

    /// Flip a layer's visibility and return the new value.
    pub fn toggle_layer_visibility(&mut self, layer_id: &str) -> Result<bool> {
        let layer = self.layer_mut(layer_id)?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    pub fn rename_layer(&mut self, layer_id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::Validation("layer name is required".into()));
        }
        self.layer_mut(layer_id)?.name = name.to_string();
        Ok(())
    }

    /// Remove a layer. The last remaining layer cannot be removed.
    pub fn delete_layer(&mut self, layer_id: &str) -> Result<Layer> {
        let pos = self
            .layers
            .iter()
            .position(|l| l.id == layer_id)
            .ok_or_else(|| StudioError::not_found("layer", layer_id))?;
        if self.layers.len() == 1 {
            return Err(StudioError::LastLayer);
        }
        Ok(self.layers.remove(pos))
    }

    /// Highest tile index used by any layer.
    pub fn max_tile_index(&self) -> u32 {
        self.layers
            .iter()
            .flat_map(|l| l.data.cells().iter().copied())
            .max()
            .unwrap_or(EMPTY_TILE)
    }

    /// Fail with `InvalidTileIndex` if any layer holds an index `tileset`
    /// does not have.
    pub fn check_indices(&self, tileset: &Tileset) -> Result<()> {
        let index = self.max_tile_index();
        if tileset.contains(index) {
            Ok(())
        } else {
            Err(StudioError::InvalidTileIndex {
                index,
                tile_count: tileset.tile_count,
            })
        }
    }

    /// Rendered size in pixels with `tileset`'s tiles.
    pub fn pixel_size(&self, tileset: &Tileset) -> Result<(u32, u32)> {
        pixel_size(self.width, self.height, tileset)
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

fn pixel_size(width: u32, height: u32, tileset: &Tileset) -> Result<(u32, u32)> {
    match (
        width.checked_mul(tileset.tile_width),
        height.checked_mul(tileset.tile_height),
    ) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(StudioError::Validation(format!(
            "{width}x{height} tiles of {}x{} px are too large to render",
            tileset.tile_width, tileset.tile_height
        ))),
    }
}

/// Reject grid sizes that are empty, hold more than `max_cells` cells or
/// cannot be rendered with `tileset`.
pub fn check_size(width: u32, height: u32, tileset: &Tileset, max_cells: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(StudioError::Validation(format!(
            "background size must be positive, got {width}x{height}"
        )));
    }
    let cells = (width as usize).checked_mul(height as usize);
    if !cells.is_some_and(|n| n <= max_cells) {
        return Err(StudioError::Validation(format!(
            "background {width}x{height} exceeds the limit of {max_cells} cells"
        )));
    }
    pixel_size(width, height, tileset).map(drop)
}
