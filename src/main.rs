use std::sync::Arc;

use anyhow::Context;
use tile_studio::{api, FsStore, Studio, StudioConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StudioConfig::from_env();
    std::fs::create_dir_all(&config.games_dir)
        .with_context(|| format!("creating games folder {}", config.games_dir.display()))?;
    log::info!("serving games from {}", config.games_dir.display());

    let store = FsStore::new(&config.games_dir);
    let studio = Studio::new(Arc::new(store), config);
    api::serve(Arc::new(studio)).await
}
