//! Persistence port for project documents and their binary assets.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::document::GameDocument;
use crate::error::{Result, StudioError};

/// Sibling folders of `game.json` holding binary assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFolder {
    Images,
    Sounds,
    Animations,
}

impl AssetFolder {
    pub fn dir_name(self) -> &'static str {
        match self {
            AssetFolder::Images => "images",
            AssetFolder::Sounds => "sounds",
            AssetFolder::Animations => "animations",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "images" => Some(AssetFolder::Images),
            "sounds" => Some(AssetFolder::Sounds),
            "animations" => Some(AssetFolder::Animations),
            _ => None,
        }
    }
}

/// Where projects live. Implementations must be usable from several request
/// handlers at once; the per-project write ordering is the caller's job.
pub trait DocumentStore: Send + Sync {
    /// Names of all projects, sorted.
    fn list_projects(&self) -> Result<Vec<String>>;

    /// Create a project holding `doc`. Fails with `AlreadyExists`.
    fn create_project(&self, name: &str, doc: &GameDocument) -> Result<()>;

    fn project_exists(&self, name: &str) -> Result<bool>;

    /// The project's document. A project without a saved document reads as
    /// an empty one named after the project.
    fn load(&self, project: &str) -> Result<GameDocument>;

    /// Replace the stored document as a whole.
    fn save(&self, project: &str, doc: &GameDocument) -> Result<()>;

    fn write_blob(&self, project: &str, folder: AssetFolder, filename: &str, bytes: &[u8]) -> Result<()>;

    fn read_blob(&self, project: &str, folder: AssetFolder, filename: &str) -> Result<Vec<u8>>;

    /// Best effort: a missing blob is not an error.
    fn remove_blob(&self, project: &str, folder: AssetFolder, filename: &str) -> Result<()>;
}

/// Reject names that could leave the store's root (separators, `..`,
/// leading dots) or that are empty.
pub fn check_name(kind: &str, name: &str) -> Result<()> {
    let ok = !name.trim().is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.'));
    if ok {
        Ok(())
    } else {
        Err(StudioError::Validation(format!("invalid {kind} name '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cannot_escape_root() {
        for bad in ["", " ", "..", "../x", "a/b", "a\\b", ".hidden", "x\0"] {
            assert!(check_name("game", bad).is_err(), "{bad:?} accepted");
        }
        for good in ["pong", "Road Puncher", "whack-a-mole_2", "v1.2"] {
            assert!(check_name("game", good).is_ok(), "{good:?} rejected");
        }
    }
}
