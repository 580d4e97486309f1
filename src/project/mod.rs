//! Per-project repository over an injected [`DocumentStore`].
//!
//! Every mutation runs load -> change -> bump version -> save while holding
//! the project's write lock, so concurrent edits of one project apply one
//! after the other instead of overwriting each other.

mod media;
mod objects;
mod tiles;

pub use media::{AnimationPatch, NewAnimation};
pub use objects::StatePatch;
pub use tiles::BackgroundPatch;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::background::check_size;
use crate::config::StudioConfig;
use crate::document::GameDocument;
use crate::error::{Result, StudioError};
use crate::store::{check_name, AssetFolder, DocumentStore};

/// Shared entry point: the store, the config and one write lock per project.
pub struct Studio {
    store: Arc<dyn DocumentStore>,
    config: StudioConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Studio {
    pub fn new(store: Arc<dyn DocumentStore>, config: StudioConfig) -> Self {
        Studio {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn list_projects(&self) -> Result<Vec<String>> {
        self.store.list_projects()
    }

    /// Create an empty project and return its first document.
    pub fn create_project(&self, name: &str) -> Result<GameDocument> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::Validation("game name is required".into()));
        }
        check_name("game", name)?;
        let doc = GameDocument::named(name);
        self.store.create_project(name, &doc)?;
        log::info!("created game '{name}'");
        Ok(doc)
    }

    /// Handle on one project. Nothing is read until an operation runs.
    pub fn project(&self, name: &str) -> Project<'_> {
        Project {
            studio: self,
            name: name.to_owned(),
        }
    }

    /// Write lock of an existing project. Unknown names fail without
    /// leaving an entry behind.
    fn lock_for(&self, project: &str) -> Result<Arc<Mutex<()>>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(project) {
            return Ok(lock.clone());
        }
        if !self.store.project_exists(project)? {
            return Err(StudioError::not_found("game", project));
        }
        Ok(locks.entry(project.to_owned()).or_default().clone())
    }
}

/// Repository for a single project, created per request.
pub struct Project<'s> {
    studio: &'s Studio,
    name: String,
}

impl<'s> Project<'s> {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn store(&self) -> &dyn DocumentStore {
        self.studio.store.as_ref()
    }

    fn config(&self) -> &StudioConfig {
        &self.studio.config
    }

    /// Current document.
    pub fn document(&self) -> Result<GameDocument> {
        self.store().load(&self.name)
    }

    /// Run `f` on the document under the project lock and persist the result
    /// when `f` reports a change.
    fn mutate_if<R>(&self, f: impl FnOnce(&mut GameDocument) -> Result<(R, bool)>) -> Result<R> {
        let lock = self.studio.lock_for(&self.name)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut doc = self.store().load(&self.name)?;
        let (out, changed) = f(&mut doc)?;
        if changed {
            doc.version += 1;
            self.store().save(&self.name, &doc)?;
            log::debug!("game '{}' saved at version {}", self.name, doc.version);
        }
        Ok(out)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut GameDocument) -> Result<R>) -> Result<R> {
        self.mutate_if(|doc| f(doc).map(|r| (r, true)))
    }

    /// Replace the whole document. When `expected_version` is given it must
    /// match the stored version or nothing is written. Backgrounds go through
    /// the same size and (in strict mode) tile index checks as single
    /// edits. Returns the new version.
    pub fn replace_document(&self, mut doc: GameDocument, expected_version: Option<u64>) -> Result<u64> {
        let max_cells = self.config().max_background_cells;
        let strict = self.config().strict_tile_indices;
        for bg in &doc.backgrounds {
            let Ok(tileset) = doc.tileset(&bg.tileset_id) else {
                continue;
            };
            check_size(bg.width, bg.height, tileset, max_cells)?;
            if strict {
                bg.check_indices(tileset)?;
            }
        }
        self.mutate(|current| {
            if let Some(expected) = expected_version {
                if expected != current.version {
                    return Err(StudioError::VersionConflict {
                        expected,
                        actual: current.version,
                    });
                }
            }
            if doc.name.is_empty() {
                doc.name = self.name.clone();
            }
            doc.version = current.version;
            *current = doc;
            Ok(current.version + 1)
        })
    }

    /// Raw bytes of a stored asset file.
    pub fn read_asset(&self, folder: AssetFolder, filename: &str) -> Result<Vec<u8>> {
        self.store().read_blob(&self.name, folder, filename)
    }

    fn remove_asset(&self, folder: AssetFolder, filename: &str) {
        if let Err(e) = self.store().remove_blob(&self.name, folder, filename) {
            log::warn!("game '{}': leaving orphan {filename}: {e}", self.name);
        }
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn unix_ms_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// `.ext` of an uploaded file name, lower-cased, if it is a plain extension.
pub(crate) fn file_extension(original: &str) -> Option<String> {
    std::path::Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
}

pub(crate) fn file_stem(original: &str) -> Option<String> {
    std::path::Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn studio() -> Studio {
        Studio::new(Arc::new(MemoryStore::new()), StudioConfig::default())
    }

    #[test]
    fn create_project_validates_name() {
        let s = studio();
        assert!(matches!(s.create_project("  "), Err(StudioError::Validation(_))));
        assert!(matches!(s.create_project("../up"), Err(StudioError::Validation(_))));
        s.create_project("pong").unwrap();
        assert!(matches!(s.create_project("pong"), Err(StudioError::AlreadyExists(_))));
        assert_eq!(s.list_projects().unwrap(), vec!["pong"]);
    }

    #[test]
    fn replace_checks_version() {
        let s = studio();
        s.create_project("pong").unwrap();
        let p = s.project("pong");

        let mut doc = p.document().unwrap();
        doc.description = "first".into();
        assert_eq!(p.replace_document(doc.clone(), Some(0)).unwrap(), 1);

        doc.description = "stale".into();
        assert!(matches!(
            p.replace_document(doc, Some(0)),
            Err(StudioError::VersionConflict { expected: 0, actual: 1 })
        ));
        assert_eq!(p.document().unwrap().description, "first");
    }

    #[test]
    fn unknown_project_is_not_found() {
        let s = studio();
        assert!(matches!(
            s.project("ghost").document(),
            Err(StudioError::NotFound { kind: "game", .. })
        ));
    }

    #[test]
    fn writes_to_unknown_projects_leave_no_lock() {
        let s = studio();
        for i in 0..5 {
            assert!(matches!(
                s.project(&format!("ghost{i}")).create_object("x"),
                Err(StudioError::NotFound { kind: "game", .. })
            ));
        }
        assert!(s.locks.lock().unwrap().is_empty());

        s.create_project("pong").unwrap();
        s.project("pong").create_object("ball").unwrap();
        assert_eq!(s.locks.lock().unwrap().len(), 1);
    }

    #[test]
    fn extension_helpers() {
        assert_eq!(file_extension("Hero.PNG").as_deref(), Some("png"));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("weird.p/g"), None);
        assert_eq!(file_stem("walk_01.png").as_deref(), Some("walk_01"));
    }
}
