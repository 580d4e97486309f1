use std::io;
use std::path::PathBuf;

/// Every failure the studio can report.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// A referenced project, image, tileset, background, layer, ... is absent
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"tileset"`
        kind: &'static str,
        /// The id that was looked up
        id: String,
    },
    /// Missing field, non-positive size, layer data of the wrong length
    #[error("{0}")]
    Validation(String),
    /// Tile index past the end of the tileset
    #[error("tile index {index} is outside tileset range 0..={tile_count}")]
    InvalidTileIndex {
        /// The rejected index
        index: u32,
        /// Number of tiles in the tileset
        tile_count: u32,
    },
    /// Deleting the only layer of a background
    #[error("a background must keep at least one layer")]
    LastLayer,
    /// Deleting the only state of an object
    #[error("an object must keep at least one state")]
    LastState,
    /// Creating something that is already there
    #[error("{0} already exists")]
    AlreadyExists(String),
    /// Deleting an entity other entities still point at
    #[error("{kind} {id} is still used by {users:?}")]
    InUse {
        /// Entity kind
        kind: &'static str,
        /// Entity id
        id: String,
        /// Ids of the referencing entities
        users: Vec<String>,
    },
    /// Whole-document write against a stale version
    #[error("document version is {actual}, expected {expected}")]
    VersionConflict {
        /// Version the caller based its write on
        expected: u64,
        /// Version currently stored
        actual: u64,
    },
    /// File system failure
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File or folder involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
    /// Corrupt `game.json`
    #[error("failed to parse {path}: {source}")]
    Json {
        /// Document path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
    /// Decoding or encoding a raster failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// Downloading a remote asset failed
    #[error("fetch failed: {0}")]
    Fetch(String),
}

impl StudioError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StudioError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StudioError::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable snake_case tag used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            StudioError::NotFound { .. } => "not_found",
            StudioError::Validation(_) => "validation",
            StudioError::InvalidTileIndex { .. } => "invalid_tile_index",
            StudioError::LastLayer => "last_layer",
            StudioError::LastState => "last_state",
            StudioError::AlreadyExists(_) => "already_exists",
            StudioError::InUse { .. } => "in_use",
            StudioError::VersionConflict { .. } => "version_conflict",
            StudioError::Io { .. } | StudioError::Json { .. } | StudioError::Image(_) => "io",
            StudioError::Fetch(_) => "fetch",
        }
    }
}

/// Shorthand used throughout the crate.
pub type Result<T, E = StudioError> = std::result::Result<T, E>;
