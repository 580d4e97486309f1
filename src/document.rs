use serde::{Deserialize, Serialize};

use crate::assets::{Animation, GameObject, ImageAsset, SoundAsset};
use crate::background::Background;
use crate::error::{Result, StudioError};
use crate::tileset::Tileset;

/// The whole `game.json` of one project.
///
/// Missing collections read as empty. Top-level keys this crate does not know
/// about are kept in `extra` and written back unchanged, since the runtime
/// that consumes the file may rely on them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameDocument {
    pub name: String,
    pub description: String,
    pub images: Vec<ImageAsset>,
    pub sounds: Vec<SoundAsset>,
    pub animations: Vec<Animation>,
    pub objects: Vec<GameObject>,
    pub tilesets: Vec<Tileset>,
    pub backgrounds: Vec<Background>,
    /// Bumped on every save; used to detect stale whole-document writes.
    pub version: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

macro_rules! finders {
    ($find:ident, $find_mut:ident, $field:ident, $ty:ty, $kind:literal) => {
        pub fn $find(&self, id: &str) -> Result<&$ty> {
            self.$field
                .iter()
                .find(|e| e.id == id)
                .ok_or_else(|| StudioError::not_found($kind, id))
        }

        pub fn $find_mut(&mut self, id: &str) -> Result<&mut $ty> {
            self.$field
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| StudioError::not_found($kind, id))
        }
    };
}

impl GameDocument {
    pub fn named(name: impl Into<String>) -> Self {
        GameDocument {
            name: name.into(),
            ..Default::default()
        }
    }

    finders!(image, image_mut, images, ImageAsset, "image");
    finders!(sound, sound_mut, sounds, SoundAsset, "sound");
    finders!(animation, animation_mut, animations, Animation, "animation");
    finders!(object, object_mut, objects, GameObject, "object");
    finders!(tileset, tileset_mut, tilesets, Tileset, "tileset");
    finders!(background, background_mut, backgrounds, Background, "background");

    /// Ids of the backgrounds painted with `tileset_id`.
    pub fn tileset_users(&self, tileset_id: &str) -> Vec<String> {
        self.backgrounds
            .iter()
            .filter(|b| b.tileset_id == tileset_id)
            .map(|b| b.id.clone())
            .collect()
    }
}

/// Remove the entity with `id` from `items` and return it.
pub(crate) fn take_by_id<T>(
    items: &mut Vec<T>,
    id: &str,
    kind: &'static str,
    key: impl Fn(&T) -> &str,
) -> Result<T> {
    let pos = items
        .iter()
        .position(|e| key(e) == id)
        .ok_or_else(|| StudioError::not_found(kind, id))?;
    Ok(items.remove(pos))
}
