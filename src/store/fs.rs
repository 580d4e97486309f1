use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{check_name, AssetFolder, DocumentStore};
use crate::document::GameDocument;
use crate::error::{Result, StudioError};

const DOCUMENT_FILE: &str = "game.json";
const ENTRY_SCRIPT: &str = "main.lua";

/// Projects as folders under one root: `<root>/<project>/game.json` plus
/// `images/`, `sounds/` and `animations/` next to it.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_dir(&self, name: &str) -> Result<PathBuf> {
        check_name("game", name)?;
        Ok(self.root.join(name))
    }

    fn blob_path(&self, project: &str, folder: AssetFolder, filename: &str) -> Result<PathBuf> {
        check_name("asset", filename)?;
        Ok(self.project_dir(project)?.join(folder.dir_name()).join(filename))
    }

    fn existing_project_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.project_dir(name)?;
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StudioError::not_found("game", name))
        }
    }
}

impl DocumentStore for FsStore {
    fn list_projects(&self) -> Result<Vec<String>> {
        fs::create_dir_all(&self.root).map_err(|e| StudioError::io(&self.root, e))?;
        let entries = fs::read_dir(&self.root).map_err(|e| StudioError::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if !path.join(ENTRY_SCRIPT).is_file() && !path.join(DOCUMENT_FILE).is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn create_project(&self, name: &str, doc: &GameDocument) -> Result<()> {
        let dir = self.project_dir(name)?;
        if dir.exists() {
            return Err(StudioError::AlreadyExists(format!("game '{name}'")));
        }
        fs::create_dir_all(&dir).map_err(|e| StudioError::io(&dir, e))?;
        self.save(name, doc)
    }

    fn project_exists(&self, name: &str) -> Result<bool> {
        Ok(self.project_dir(name)?.is_dir())
    }

    fn load(&self, project: &str) -> Result<GameDocument> {
        let path = self.existing_project_dir(project)?.join(DOCUMENT_FILE);
        let txt = match fs::read_to_string(&path) {
            Ok(txt) => txt,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(GameDocument::named(project)),
            Err(source) => return Err(StudioError::Io { path, source }),
        };
        let mut doc: GameDocument =
            serde_json::from_str(&txt).map_err(|source| StudioError::Json { path, source })?;
        if doc.name.is_empty() {
            doc.name = project.to_owned();
        }
        Ok(doc)
    }

    fn save(&self, project: &str, doc: &GameDocument) -> Result<()> {
        let dir = self.existing_project_dir(project)?;
        let path = dir.join(DOCUMENT_FILE);
        let tmp = dir.join(format!("{DOCUMENT_FILE}.tmp"));

        let txt = serde_json::to_string_pretty(doc).map_err(|source| StudioError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&tmp, txt).map_err(|e| StudioError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StudioError::io(&path, e))
    }

    fn write_blob(&self, project: &str, folder: AssetFolder, filename: &str, bytes: &[u8]) -> Result<()> {
        self.existing_project_dir(project)?;
        let path = self.blob_path(project, folder, filename)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StudioError::io(parent, e))?;
        }
        fs::write(&path, bytes).map_err(|e| StudioError::io(&path, e))
    }

    fn read_blob(&self, project: &str, folder: AssetFolder, filename: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(project, folder, filename)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StudioError::not_found("asset file", filename))
            }
            Err(source) => Err(StudioError::Io { path, source }),
        }
    }

    fn remove_blob(&self, project: &str, folder: AssetFolder, filename: &str) -> Result<()> {
        let path = self.blob_path(project, folder, filename)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                log::warn!("could not unlink {}: {e}", path.display());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_folders_with_a_document_or_script() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        fs::create_dir_all(dir.path().join("zeta")).unwrap();
        fs::write(dir.path().join("zeta").join("main.lua"), "-- game").unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        store.create_project("alpha", &GameDocument::named("alpha")).unwrap();

        assert_eq!(store.list_projects().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn folder_without_document_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        fs::create_dir_all(dir.path().join("legacy")).unwrap();

        let doc = store.load("legacy").unwrap();
        assert_eq!(doc.name, "legacy");
        assert!(doc.images.is_empty());
        assert!(matches!(store.load("missing"), Err(StudioError::NotFound { .. })));
    }

    #[test]
    fn save_is_pretty_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        store.create_project("p", &GameDocument::named("p")).unwrap();

        let txt = fs::read_to_string(dir.path().join("p").join("game.json")).unwrap();
        assert!(txt.contains("\n  \"name\": \"p\""));
        assert!(!dir.path().join("p").join("game.json.tmp").exists());
        assert!(matches!(
            store.create_project("p", &GameDocument::named("p")),
            Err(StudioError::AlreadyExists(_))
        ));
    }

    #[test]
    fn corrupt_document_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        fs::create_dir_all(dir.path().join("p")).unwrap();
        fs::write(dir.path().join("p").join("game.json"), "{ not json").unwrap();
        assert!(matches!(store.load("p"), Err(StudioError::Json { .. })));
    }

    #[test]
    fn blobs_round_trip_and_unlink_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        store.create_project("p", &GameDocument::named("p")).unwrap();

        store.write_blob("p", AssetFolder::Sounds, "a.wav", b"RIFF").unwrap();
        assert!(dir.path().join("p/sounds/a.wav").is_file());
        assert_eq!(store.read_blob("p", AssetFolder::Sounds, "a.wav").unwrap(), b"RIFF");

        store.remove_blob("p", AssetFolder::Sounds, "a.wav").unwrap();
        store.remove_blob("p", AssetFolder::Sounds, "a.wav").unwrap();
        assert!(matches!(
            store.read_blob("p", AssetFolder::Sounds, "a.wav"),
            Err(StudioError::NotFound { .. })
        ));
        assert!(store.read_blob("p", AssetFolder::Images, "../game.json").is_err());
    }
}
