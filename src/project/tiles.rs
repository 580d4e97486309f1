use image::RgbaImage;
use serde::Deserialize;

use super::Project;
use crate::background::{Background, Layer};
use crate::document::take_by_id;
use crate::error::{Result, StudioError};
use crate::raw::RawLayer;
use crate::render;
use crate::store::AssetFolder;
use crate::tileset::{TileRect, Tileset, EMPTY_TILE};

/// Merge update for a background. Size is fixed at creation: `width` and
/// `height` may be sent back but must not change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundPatch {
    pub name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub tileset_id: Option<String>,
    pub layers: Option<Vec<RawLayer>>,
}

impl Project<'_> {
    pub fn create_tileset(&self, name: &str, image_id: &str, tile_width: u32, tile_height: u32) -> Result<Tileset> {
        self.mutate(|doc| {
            let image = doc.image(image_id)?;
            let tileset = Tileset::partition(name.trim(), image, tile_width, tile_height)?;
            doc.tilesets.push(tileset.clone());
            Ok(tileset)
        })
    }

    /// Source rectangle of one tile of a tileset.
    pub fn tile_rect(&self, tileset_id: &str, index: u32) -> Result<TileRect> {
        let doc = self.document()?;
        let tileset = doc.tileset(tileset_id)?;
        if index == EMPTY_TILE || !tileset.contains(index) {
            return Err(StudioError::InvalidTileIndex {
                index,
                tile_count: tileset.tile_count,
            });
        }
        tileset.tile_rect(index).ok_or(StudioError::InvalidTileIndex {
            index,
            tile_count: tileset.tile_count,
        })
    }

    /// Delete a tileset no background uses any more.
    pub fn delete_tileset(&self, id: &str) -> Result<()> {
        self.mutate(|doc| {
            doc.tileset(id)?;
            let users = doc.tileset_users(id);
            if !users.is_empty() {
                return Err(StudioError::InUse {
                    kind: "tileset",
                    id: id.to_owned(),
                    users,
                });
            }
            take_by_id(&mut doc.tilesets, id, "tileset", |t| &t.id).map(drop)
        })
    }

    pub fn create_background(&self, name: &str, width: u32, height: u32, tileset_id: &str) -> Result<Background> {
        let max_cells = self.config().max_background_cells;
        self.mutate(|doc| {
            let tileset = doc.tileset(tileset_id)?;
            let bg = Background::with_cell_limit(name.trim(), width, height, tileset, max_cells)?;
            doc.backgrounds.push(bg.clone());
            Ok(bg)
        })
    }

    /// Merge `patch` into a background, keeping its id and size.
    ///
    /// In strict mode every cell of the result must index the resulting
    /// tileset, so switching to a smaller tileset can fail too.
    pub fn update_background(&self, id: &str, patch: BackgroundPatch) -> Result<Background> {
        let strict = self.config().strict_tile_indices;
        self.mutate(|doc| {
            let mut bg = doc.background(id)?.clone();
            if patch.width.is_some_and(|w| w != bg.width) || patch.height.is_some_and(|h| h != bg.height) {
                return Err(StudioError::Validation(format!(
                    "background {id} is {}x{} and cannot be resized",
                    bg.width, bg.height
                )));
            }
            if let Some(name) = patch.name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(StudioError::Validation("background name is required".into()));
                }
                bg.name = name.to_owned();
            }
            if let Some(tileset_id) = patch.tileset_id {
                doc.tileset(&tileset_id)?;
                bg.tileset_id = tileset_id;
            }
            match patch.layers {
                Some(raw) if raw.is_empty() => {
                    return Err(StudioError::Validation(
                        "a background must keep at least one layer".into(),
                    ))
                }
                Some(raw) => {
                    bg.layers = raw
                        .into_iter()
                        .map(|l| Layer::from_raw(l, bg.width, bg.height))
                        .collect::<Result<Vec<_>>>()?;
                }
                None => {}
            }
            if strict {
                bg.check_indices(doc.tileset(&bg.tileset_id)?)?;
            }

            bg.touch();
            *doc.background_mut(id)? = bg.clone();
            Ok(bg)
        })
    }

    pub fn delete_background(&self, id: &str) -> Result<()> {
        self.mutate(|doc| take_by_id(&mut doc.backgrounds, id, "background", |b| &b.id).map(drop))
    }

    /// Paint one cell of one layer and persist it.
    ///
    /// Off-grid coordinates and repaints of the same index succeed without
    /// writing anything. In strict mode non-empty indices must exist in the
    /// background's tileset.
    pub fn paint_tile(&self, background_id: &str, layer_id: &str, x: i32, y: i32, tile: u32) -> Result<Background> {
        let strict = self.config().strict_tile_indices;
        self.mutate_if(|doc| {
            if strict && tile != EMPTY_TILE {
                let tileset_id = &doc.background(background_id)?.tileset_id;
                let tileset = doc.tileset(tileset_id)?;
                if !tileset.contains(tile) {
                    return Err(StudioError::InvalidTileIndex {
                        index: tile,
                        tile_count: tileset.tile_count,
                    });
                }
            }
            let bg = doc.background_mut(background_id)?;
            let changed = bg.paint_tile(layer_id, x, y, tile)?.changed();
            if changed {
                bg.touch();
            }
            Ok((bg.clone(), changed))
        })
    }

    pub fn add_layer(&self, background_id: &str, name: Option<String>) -> Result<Background> {
        self.edit_background(background_id, |bg| {
            bg.add_layer(name);
            Ok(())
        })
    }

    pub fn rename_layer(&self, background_id: &str, layer_id: &str, name: &str) -> Result<Background> {
        self.edit_background(background_id, |bg| bg.rename_layer(layer_id, name))
    }

    pub fn toggle_layer_visibility(&self, background_id: &str, layer_id: &str) -> Result<Background> {
        self.edit_background(background_id, |bg| bg.toggle_layer_visibility(layer_id).map(drop))
    }

    /// Fails with `LastLayer` rather than leave a background without layers.
    pub fn delete_layer(&self, background_id: &str, layer_id: &str) -> Result<Background> {
        self.edit_background(background_id, |bg| bg.delete_layer(layer_id).map(drop))
    }

    fn edit_background(&self, id: &str, f: impl FnOnce(&mut Background) -> Result<()>) -> Result<Background> {
        self.mutate(|doc| {
            let bg = doc.background_mut(id)?;
            f(bg)?;
            bg.touch();
            Ok(bg.clone())
        })
    }

    /// Flatten a background's visible layers using its tileset's image.
    pub fn composite_background(&self, id: &str) -> Result<RgbaImage> {
        let doc = self.document()?;
        let bg = doc.background(id)?;
        let tileset = doc.tileset(&bg.tileset_id)?;
        let image = doc.image(&tileset.image_id)?;
        let source = render::decode_rgba(&self.read_asset(AssetFolder::Images, &image.filename)?)?;
        render::composite(bg, tileset, &source)
    }

    /// [`Project::composite_background`] encoded as PNG.
    pub fn render_background(&self, id: &str) -> Result<Vec<u8>> {
        render::encode_png(&self.composite_background(id)?)
    }
}
