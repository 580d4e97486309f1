use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_UPLOAD_MB: usize = 32;
/// Largest background grid accepted by default (2048 x 2048 cells).
pub const DEFAULT_MAX_BACKGROUND_CELLS: usize = 2048 * 2048;

/// Runtime settings of the studio server.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Folder holding one sub-folder per game.
    pub games_dir: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
    /// Reject painted tile indices past the end of the tileset.
    pub strict_tile_indices: bool,
    /// Timeout for `from-url` downloads of remote assets.
    pub fetch_timeout: Duration,
    pub max_upload_bytes: usize,
    /// Upper bound on `width * height` of a background.
    pub max_background_cells: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            games_dir: PathBuf::from("games"),
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            strict_tile_indices: true,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            max_background_cells: DEFAULT_MAX_BACKGROUND_CELLS,
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl StudioConfig {
    /// Defaults overridden by `STUDIO_*` environment variables (and `PORT`).
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let mut cfg = StudioConfig::default();

        if let Some(dir) = var("STUDIO_GAMES_DIR") {
            cfg.games_dir = PathBuf::from(dir);
        }
        if let Some(v) = var("STUDIO_BIND") {
            match v.parse() {
                Ok(ip) => cfg.bind = ip,
                Err(_) => log::warn!("STUDIO_BIND={v} is not an IP address, using {}", cfg.bind),
            }
        }
        if let Some(v) = var("STUDIO_PORT").or_else(|| var("PORT")) {
            match v.parse() {
                Ok(port) => cfg.port = port,
                Err(_) => log::warn!("port {v} is invalid, using {}", cfg.port),
            }
        }
        if let Some(v) = var("STUDIO_STRICT_TILES") {
            match parse_flag(&v) {
                Some(flag) => cfg.strict_tile_indices = flag,
                None => log::warn!("STUDIO_STRICT_TILES={v} is not a boolean, keeping strict mode"),
            }
        }
        if let Some(secs) = var("STUDIO_FETCH_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            cfg.fetch_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(mb) = var("STUDIO_MAX_UPLOAD_MB").and_then(|v| v.parse::<usize>().ok()) {
            cfg.max_upload_bytes = mb.max(1) * 1024 * 1024;
        }
        if let Some(cells) = var("STUDIO_MAX_BACKGROUND_CELLS").and_then(|v| v.parse::<usize>().ok()) {
            cfg.max_background_cells = cells.max(1);
        }
        cfg
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
