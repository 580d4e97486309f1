//! Wire forms of the entities whose in-memory shape differs from `game.json`.
//!
//! Backgrounds carry their layers as bare `data` arrays and object states
//! carry their visual as a `visualType` / `visualId` pair; both are checked
//! and converted on the way in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assets::{ObjectState, Visual};
use crate::background::{Background, Layer};
use crate::error::StudioError;
use crate::grid::Grid;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLayer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBackground {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tileset_id: String,
    #[serde(default)]
    pub layers: Vec<RawLayer>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Layer {
    /// Check a wire layer against the owning background's grid size.
    pub fn from_raw(raw: RawLayer, width: u32, height: u32) -> Result<Self, StudioError> {
        let data = Grid::from_cells(width, height, raw.data).map_err(|_| {
            StudioError::Validation(format!(
                "layer '{}' must hold exactly {} tiles",
                raw.name,
                width as usize * height as usize
            ))
        })?;
        Ok(Layer {
            id: raw.id,
            name: raw.name,
            visible: raw.visible,
            data,
        })
    }
}

impl From<Layer> for RawLayer {
    fn from(layer: Layer) -> Self {
        RawLayer {
            id: layer.id,
            name: layer.name,
            visible: layer.visible,
            data: layer.data.into_cells(),
        }
    }
}

impl TryFrom<RawBackground> for Background {
    type Error = StudioError;

    fn try_from(raw: RawBackground) -> Result<Self, Self::Error> {
        let (width, height) = (raw.width, raw.height);
        let layers = raw
            .layers
            .into_iter()
            .map(|l| Layer::from_raw(l, width, height))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Background {
            id: raw.id,
            name: raw.name,
            width,
            height,
            tileset_id: raw.tileset_id,
            layers,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

impl From<Background> for RawBackground {
    fn from(bg: Background) -> Self {
        RawBackground {
            id: bg.id,
            name: bg.name,
            width: bg.width,
            height: bg.height,
            tileset_id: bg.tileset_id,
            layers: bg.layers.into_iter().map(RawLayer::from).collect(),
            created_at: bg.created_at,
            updated_at: bg.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObjectState {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub visual_type: Option<String>,
    #[serde(default)]
    pub visual_id: Option<String>,
    #[serde(default)]
    pub sound_id: Option<String>,
}

impl TryFrom<RawObjectState> for ObjectState {
    type Error = StudioError;

    fn try_from(raw: RawObjectState) -> Result<Self, Self::Error> {
        let visual = Visual::from_parts(raw.visual_type.as_deref(), raw.visual_id)?;
        Ok(ObjectState {
            id: raw.id,
            name: raw.name,
            visual,
            sound_id: raw.sound_id,
        })
    }
}

impl From<ObjectState> for RawObjectState {
    fn from(state: ObjectState) -> Self {
        let (visual_type, visual_id) = match state.visual {
            Some(v) => (Some(v.type_name().to_string()), Some(v.id().to_string())),
            None => (None, None),
        };
        RawObjectState {
            id: state.id,
            name: state.name,
            visual_type,
            visual_id,
            sound_id: state.sound_id,
        }
    }
}
