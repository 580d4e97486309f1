use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{check_name, AssetFolder, DocumentStore};
use crate::document::GameDocument;
use crate::error::{Result, StudioError};

#[derive(Default)]
struct MemProject {
    doc: Option<GameDocument>,
    blobs: HashMap<(AssetFolder, String), Vec<u8>>,
}

/// Keeps every project in memory. Handy for tests and for embedding the
/// studio without a disk behind it.
#[derive(Default)]
pub struct MemoryStore {
    projects: Mutex<BTreeMap<String, MemProject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn projects(&self) -> MutexGuard<'_, BTreeMap<String, MemProject>> {
        self.projects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryStore {
    fn list_projects(&self) -> Result<Vec<String>> {
        // BTreeMap keys are already sorted
        Ok(self.projects().keys().cloned().collect())
    }

    fn create_project(&self, name: &str, doc: &GameDocument) -> Result<()> {
        check_name("game", name)?;
        let mut projects = self.projects();
        if projects.contains_key(name) {
            return Err(StudioError::AlreadyExists(format!("game '{name}'")));
        }
        projects.insert(
            name.to_owned(),
            MemProject {
                doc: Some(doc.clone()),
                blobs: HashMap::new(),
            },
        );
        Ok(())
    }

    fn project_exists(&self, name: &str) -> Result<bool> {
        Ok(self.projects().contains_key(name))
    }

    fn load(&self, project: &str) -> Result<GameDocument> {
        let projects = self.projects();
        let p = projects
            .get(project)
            .ok_or_else(|| StudioError::not_found("game", project))?;
        Ok(p.doc.clone().unwrap_or_else(|| GameDocument::named(project)))
    }

    fn save(&self, project: &str, doc: &GameDocument) -> Result<()> {
        let mut projects = self.projects();
        let p = projects
            .get_mut(project)
            .ok_or_else(|| StudioError::not_found("game", project))?;
        p.doc = Some(doc.clone());
        Ok(())
    }

    fn write_blob(&self, project: &str, folder: AssetFolder, filename: &str, bytes: &[u8]) -> Result<()> {
        check_name("asset", filename)?;
        let mut projects = self.projects();
        let p = projects
            .get_mut(project)
            .ok_or_else(|| StudioError::not_found("game", project))?;
        p.blobs.insert((folder, filename.to_owned()), bytes.to_vec());
        Ok(())
    }

    fn read_blob(&self, project: &str, folder: AssetFolder, filename: &str) -> Result<Vec<u8>> {
        self.projects()
            .get(project)
            .and_then(|p| p.blobs.get(&(folder, filename.to_owned())))
            .cloned()
            .ok_or_else(|| StudioError::not_found("asset file", filename))
    }

    fn remove_blob(&self, project: &str, folder: AssetFolder, filename: &str) -> Result<()> {
        if let Some(p) = self.projects().get_mut(project) {
            p.blobs.remove(&(folder, filename.to_owned()));
        }
        Ok(())
    }
}
