use serde::{Deserialize, Deserializer};

use super::Project;
use crate::assets::{GameObject, ObjectState, Visual};
use crate::document::{take_by_id, GameDocument};
use crate::error::{Result, StudioError};

/// Partial state update. For the nullable fields, an absent key leaves the
/// value alone while an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub visual_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub visual_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sound_id: Option<Option<String>>,
}

fn double_option<'de, D, T>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl Project<'_> {
    pub fn create_object(&self, name: &str) -> Result<GameObject> {
        let obj = GameObject::new(name)?;
        self.mutate(|doc| {
            doc.objects.push(obj.clone());
            Ok(obj)
        })
    }

    pub fn rename_object(&self, id: &str, name: &str) -> Result<GameObject> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::Validation("object name is required".into()));
        }
        self.mutate(|doc| {
            let obj = doc.object_mut(id)?;
            obj.name = name.to_owned();
            Ok(obj.clone())
        })
    }

    pub fn delete_object(&self, id: &str) -> Result<()> {
        self.mutate(|doc| take_by_id(&mut doc.objects, id, "object", |o| &o.id).map(drop))
    }

    pub fn add_state(&self, object_id: &str, name: &str) -> Result<GameObject> {
        self.mutate(|doc| {
            let obj = doc.object_mut(object_id)?;
            obj.add_state(name)?;
            Ok(obj.clone())
        })
    }

    /// Apply `patch` to one state. Referenced images, animations and sounds
    /// must exist in the project.
    pub fn update_state(&self, object_id: &str, state_id: &str, patch: StatePatch) -> Result<GameObject> {
        self.mutate(|doc| {
            let current = doc.object(object_id)?.states.iter().find(|s| s.id == state_id).cloned();
            let mut state = current.ok_or_else(|| StudioError::not_found("state", state_id))?;
            apply_state_patch(doc, &mut state, patch)?;

            let obj = doc.object_mut(object_id)?;
            *obj.state_mut(state_id)? = state;
            Ok(obj.clone())
        })
    }

    /// Fails with `LastState` for an object's only state.
    pub fn delete_state(&self, object_id: &str, state_id: &str) -> Result<GameObject> {
        self.mutate(|doc| {
            let obj = doc.object_mut(object_id)?;
            obj.delete_state(state_id)?;
            Ok(obj.clone())
        })
    }
}

fn apply_state_patch(doc: &GameDocument, state: &mut ObjectState, patch: StatePatch) -> Result<()> {
    if let Some(name) = patch.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::Validation("state name is required".into()));
        }
        state.name = name.to_owned();
    }

    if patch.visual_type.is_some() || patch.visual_id.is_some() {
        let kind = match patch.visual_type {
            Some(kind) => kind,
            None => state.visual.as_ref().map(|v| v.type_name().to_owned()),
        };
        let id = match patch.visual_id {
            Some(id) => id,
            None => state.visual.as_ref().map(|v| v.id().to_owned()),
        };
        let visual = Visual::from_parts(kind.as_deref(), id)?;
        match &visual {
            Some(Visual::Image(id)) => {
                doc.image(id)?;
            }
            Some(Visual::Animation(id)) => {
                doc.animation(id)?;
            }
            None => {}
        }
        state.visual = visual;
    }

    if let Some(sound_id) = patch.sound_id {
        let sound_id = sound_id.filter(|id| !id.is_empty());
        if let Some(id) = &sound_id {
            doc.sound(id)?;
        }
        state.sound_id = sound_id;
    }
    Ok(())
}
