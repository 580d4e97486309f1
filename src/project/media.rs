use chrono::Utc;
use image::RgbaImage;
use serde::Deserialize;

use super::{file_extension, file_stem, new_id, unix_ms_now, Project};
use crate::assets::{Animation, ImageAsset, SoundAsset};
use crate::document::{take_by_id, GameDocument};
use crate::error::{Result, StudioError};
use crate::render;
use crate::store::AssetFolder;

/// Body of an animation create request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimation {
    pub name: String,
    #[serde(default)]
    pub image_ids: Vec<String>,
    pub frame_duration: Option<f32>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
}

/// Partial animation update; absent fields stay as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationPatch {
    pub name: Option<String>,
    pub image_ids: Option<Vec<String>>,
    pub frame_duration: Option<f32>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
}

impl Project<'_> {
    /// Store an uploaded image under a fresh `<uuid>.<ext>` name.
    ///
    /// The bytes must decode as an image; the display name defaults to the
    /// uploaded file's stem.
    pub fn add_image(&self, name: Option<&str>, original_filename: &str, bytes: &[u8]) -> Result<ImageAsset> {
        let (width, height) = render::probe_dimensions(bytes).map_err(unreadable)?;
        let id = new_id();
        let filename = match file_extension(original_filename) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.clone(),
        };
        let name = non_empty(name)
            .or_else(|| file_stem(original_filename))
            .unwrap_or_else(|| id.clone());
        let image = ImageAsset {
            id,
            name,
            filename,
            width,
            height,
            created_at: Utc::now(),
        };
        self.insert_with_blob(AssetFolder::Images, &image.filename, bytes, image.clone(), |doc, img| {
            doc.images.push(img)
        })?;
        Ok(image)
    }

    /// Store image bytes of any supported format re-encoded as PNG.
    pub fn add_image_as_png(&self, name: Option<&str>, bytes: &[u8]) -> Result<ImageAsset> {
        let png = render::encode_png(&render::decode_rgba(bytes).map_err(unreadable)?)?;
        let name = non_empty(name).unwrap_or_else(|| format!("generated-{}", unix_ms_now()));
        self.add_image(Some(&name), "generated.png", &png)
    }

    /// Drop an image record and unlink its file. Tilesets and animations made
    /// from it are left alone.
    pub fn delete_image(&self, id: &str) -> Result<()> {
        let image = self.mutate(|doc| take_by_id(&mut doc.images, id, "image", |i| &i.id))?;
        self.remove_asset(AssetFolder::Images, &image.filename);
        Ok(())
    }

    /// Store an uploaded sound; its format is the file extension.
    pub fn add_sound(&self, name: Option<&str>, original_filename: &str, bytes: &[u8]) -> Result<SoundAsset> {
        let format = file_extension(original_filename).ok_or_else(|| {
            StudioError::Validation(format!("sound file '{original_filename}' has no extension"))
        })?;
        let name = non_empty(name).or_else(|| file_stem(original_filename));
        self.add_sound_with_format(name.as_deref(), &format, bytes)
    }

    pub fn add_sound_with_format(&self, name: Option<&str>, format: &str, bytes: &[u8]) -> Result<SoundAsset> {
        if bytes.is_empty() {
            return Err(StudioError::Validation("sound file is empty".into()));
        }
        let id = new_id();
        let sound = SoundAsset {
            filename: format!("{id}.{format}"),
            name: non_empty(name).unwrap_or_else(|| format!("generated-{}", unix_ms_now())),
            format: format.to_owned(),
            id,
            created_at: Utc::now(),
        };
        self.insert_with_blob(AssetFolder::Sounds, &sound.filename, bytes, sound.clone(), |doc, s| {
            doc.sounds.push(s)
        })?;
        Ok(sound)
    }

    pub fn delete_sound(&self, id: &str) -> Result<()> {
        let sound = self.mutate(|doc| take_by_id(&mut doc.sounds, id, "sound", |s| &s.id))?;
        self.remove_asset(AssetFolder::Sounds, &sound.filename);
        Ok(())
    }

    /// Build a sprite sheet from the listed images and record it.
    /// Unknown image ids are skipped.
    pub fn create_animation(&self, req: NewAnimation) -> Result<Animation> {
        let name = req.name.trim().to_owned();
        if name.is_empty() {
            return Err(StudioError::Validation("animation name is required".into()));
        }
        let mut written = None;
        let saved = self.mutate(|doc| {
            let (sheet, frame_count) = self.build_sheet(doc, &req.image_ids)?;
            let id = new_id();
            let anim = Animation {
                filename: format!("{id}.png"),
                id,
                name,
                frame_width: sheet.width() / frame_count,
                frame_height: sheet.height(),
                frame_count,
                frame_duration: req.frame_duration.unwrap_or(0.1),
                looping: req.looping.unwrap_or(true),
                source_images: req.image_ids,
                created_at: Utc::now(),
                updated_at: None,
            };
            self.write_sheet(&anim.filename, &sheet)?;
            written = Some(anim.filename.clone());
            doc.animations.push(anim.clone());
            Ok(anim)
        });
        if let (Err(_), Some(filename)) = (&saved, written) {
            self.remove_asset(AssetFolder::Animations, &filename);
        }
        saved
    }

    /// Merge `patch` into an animation. The sheet is rebuilt in place only
    /// when the image list actually changed.
    pub fn update_animation(&self, id: &str, patch: AnimationPatch) -> Result<Animation> {
        let mut replaced = None;
        let saved = self.mutate(|doc| {
            let current = doc.animation(id)?.clone();
            let mut anim = current.clone();

            if let Some(ids) = patch.image_ids.filter(|ids| *ids != current.source_images) {
                let (sheet, frame_count) = self.build_sheet(doc, &ids)?;
                let previous = self.read_asset(AssetFolder::Animations, &anim.filename).ok();
                self.write_sheet(&anim.filename, &sheet)?;
                replaced = Some((anim.filename.clone(), previous));
                anim.frame_width = sheet.width() / frame_count;
                anim.frame_height = sheet.height();
                anim.frame_count = frame_count;
                anim.source_images = ids;
            }
            if let Some(name) = patch.name {
                anim.name = name;
            }
            if let Some(d) = patch.frame_duration {
                anim.frame_duration = d;
            }
            if let Some(l) = patch.looping {
                anim.looping = l;
            }
            anim.updated_at = Some(Utc::now());

            *doc.animation_mut(id)? = anim.clone();
            Ok(anim)
        });
        if let (Err(_), Some((filename, previous))) = (&saved, replaced) {
            self.restore_sheet(&filename, previous);
        }
        saved
    }

    pub fn delete_animation(&self, id: &str) -> Result<()> {
        let anim = self.mutate(|doc| take_by_id(&mut doc.animations, id, "animation", |a| &a.id))?;
        self.remove_asset(AssetFolder::Animations, &anim.filename);
        Ok(())
    }

    fn build_sheet(&self, doc: &GameDocument, image_ids: &[String]) -> Result<(RgbaImage, u32)> {
        let frames = image_ids
            .iter()
            .filter_map(|id| doc.image(id).ok())
            .map(|img| render::decode_rgba(&self.read_asset(AssetFolder::Images, &img.filename)?))
            .collect::<Result<Vec<_>>>()?;
        let sheet = render::horizontal_strip(&frames)?;
        Ok((sheet, frames.len() as u32))
    }

    fn write_sheet(&self, filename: &str, sheet: &RgbaImage) -> Result<()> {
        let png = render::encode_png(sheet)?;
        self.store()
            .write_blob(self.name(), AssetFolder::Animations, filename, &png)
    }

    /// Put back the sheet an unsaved update overwrote.
    fn restore_sheet(&self, filename: &str, previous: Option<Vec<u8>>) {
        let Some(bytes) = previous else {
            self.remove_asset(AssetFolder::Animations, filename);
            return;
        };
        if let Err(e) = self
            .store()
            .write_blob(self.name(), AssetFolder::Animations, filename, &bytes)
        {
            log::warn!("game '{}': could not restore sheet {filename}: {e}", self.name());
        }
    }

    /// Write the file first, then the record; undo the file if the record
    /// cannot be saved.
    fn insert_with_blob<T>(
        &self,
        folder: AssetFolder,
        filename: &str,
        bytes: &[u8],
        record: T,
        insert: impl FnOnce(&mut GameDocument, T),
    ) -> Result<()> {
        self.store().write_blob(self.name(), folder, filename, bytes)?;
        let saved = self.mutate(|doc| {
            insert(doc, record);
            Ok(())
        });
        if saved.is_err() {
            self.remove_asset(folder, filename);
        }
        saved
    }
}

fn unreadable(e: StudioError) -> StudioError {
    match e {
        StudioError::Image(e) => StudioError::Validation(format!("not a readable image: {e}")),
        other => other,
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}
