use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::raw::RawObjectState;

/// An uploaded picture stored in the project's `images/` folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    pub id: String,
    pub name: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
}

/// An uploaded sound stored in `sounds/`; `format` is the bare extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundAsset {
    pub id: String,
    pub name: String,
    pub filename: String,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

fn default_frame_duration() -> f32 {
    0.1
}

fn default_true() -> bool {
    true
}

/// A horizontal sprite sheet generated from a list of same-sized images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub id: String,
    pub name: String,
    pub filename: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: u32,
    #[serde(default = "default_frame_duration")]
    pub frame_duration: f32,
    #[serde(rename = "loop", default = "default_true")]
    pub looping: bool,
    #[serde(default)]
    pub source_images: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// What an object state shows: a still image or an animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visual {
    Image(String),
    Animation(String),
}

impl Visual {
    /// Rebuild from the `visualType` / `visualId` pair. A missing half means
    /// no visual.
    pub fn from_parts(kind: Option<&str>, id: Option<String>) -> Result<Option<Self>> {
        let (Some(kind), Some(id)) = (kind, id.filter(|id| !id.is_empty())) else {
            return Ok(None);
        };
        match kind {
            "image" => Ok(Some(Visual::Image(id))),
            "animation" => Ok(Some(Visual::Animation(id))),
            other => Err(StudioError::Validation(format!(
                "unknown visual type '{other}'"
            ))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Visual::Image(_) => "image",
            Visual::Animation(_) => "animation",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Visual::Image(id) | Visual::Animation(id) => id,
        }
    }
}

/// One named state of a game object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObjectState", into = "RawObjectState")]
pub struct ObjectState {
    pub id: String,
    pub name: String,
    pub visual: Option<Visual>,
    pub sound_id: Option<String>,
}

impl ObjectState {
    pub fn named(name: impl Into<String>) -> Self {
        ObjectState {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            visual: None,
            sound_id: None,
        }
    }
}

/// A stateful game object for the runtime: a name and at least one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub states: Vec<ObjectState>,
    pub created_at: DateTime<Utc>,
}

impl GameObject {
    /// A new object with a single visual-less "default" state.
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::Validation("object name is required".into()));
        }
        Ok(GameObject {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            states: vec![ObjectState::named("default")],
            created_at: Utc::now(),
        })
    }

    pub fn state_mut(&mut self, state_id: &str) -> Result<&mut ObjectState> {
        self.states
            .iter_mut()
            .find(|s| s.id == state_id)
            .ok_or_else(|| StudioError::not_found("state", state_id))
    }

    pub fn add_state(&mut self, name: &str) -> Result<&ObjectState> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::Validation("state name is required".into()));
        }
        self.states.push(ObjectState::named(name));
        Ok(&self.states[self.states.len() - 1])
    }

    /// Remove a state; the only remaining state cannot be removed.
    pub fn delete_state(&mut self, state_id: &str) -> Result<ObjectState> {
        let pos = self
            .states
            .iter()
            .position(|s| s.id == state_id)
            .ok_or_else(|| StudioError::not_found("state", state_id))?;
        if self.states.len() <= 1 {
            return Err(StudioError::LastState);
        }
        Ok(self.states.remove(pos))
    }
}
