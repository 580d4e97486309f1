//! Tile studio: tileset partitioning, layered tile backgrounds and the
//! asset repository behind a small game-authoring editor.
//!
//! Projects live in a [`DocumentStore`] as one `game.json` plus asset
//! folders. [`Studio`] hands out per-project [`Project`] repositories; the
//! [`api`] module exposes them over HTTP and [`view`] previews backgrounds
//! with macroquad.

pub mod api;
pub mod assets;
pub mod background;
pub mod config;
pub mod document;
mod error;
pub mod fetch;
pub mod grid;
pub mod project;
pub mod raw;
pub mod render;
pub mod store;
pub mod tileset;
pub mod view;

pub use assets::{Animation, GameObject, ImageAsset, ObjectState, SoundAsset, Visual};
pub use background::{Background, Layer, PaintOutcome};
pub use config::StudioConfig;
pub use document::GameDocument;
pub use error::{Result, StudioError};
pub use grid::Grid;
pub use project::{Project, Studio};
pub use store::{AssetFolder, DocumentStore, FsStore, MemoryStore};
pub use tileset::{TileRect, Tileset, EMPTY_TILE};
