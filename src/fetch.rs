//! Byte sources for the `from-url` import routes: inline `data:` URLs and
//! plain http(s) downloads.

use std::io::Read;
use std::time::Duration;

use base64::Engine as _;

use crate::error::{Result, StudioError};

/// Bytes plus the MIME type they were declared with, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decode `data:<mime>;base64,<payload>`.
pub fn parse_data_url(url: &str) -> Result<Fetched> {
    let invalid = || StudioError::Validation("Invalid data URL".into());
    let rest = url.strip_prefix("data:").ok_or_else(invalid)?;
    let (mime, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
    if mime.is_empty() || payload.is_empty() {
        return Err(invalid());
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| StudioError::Validation(format!("Invalid data URL: {e}")))?;
    Ok(Fetched {
        mime: Some(mime.to_owned()),
        bytes,
    })
}

/// Download `url`, reading at most `limit` bytes. Blocking.
pub fn fetch_remote(url: &str, timeout: Duration, limit: usize) -> Result<Fetched> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(StudioError::Validation(format!(
            "unsupported url scheme in '{url}'"
        )));
    }
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::Status(code, _) => StudioError::Fetch(format!("{url} answered HTTP {code}")),
        other => StudioError::Fetch(other.to_string()),
    })?;

    let mime = response
        .header("Content-Type")
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_owned())
        .filter(|v| !v.is_empty());
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| StudioError::Fetch(format!("reading {url}: {e}")))?;
    if bytes.len() > limit {
        return Err(StudioError::Validation(format!(
            "{url} is larger than {limit} bytes"
        )));
    }
    log::debug!("fetched {} bytes from {url}", bytes.len());
    Ok(Fetched { mime, bytes })
}

/// Either of the above, chosen by the url's scheme.
pub fn load(url: &str, timeout: Duration, limit: usize) -> Result<Fetched> {
    let url = url.trim();
    if url.is_empty() {
        return Err(StudioError::Validation("url is required".into()));
    }
    if url.starts_with("data:") {
        parse_data_url(url)
    } else {
        fetch_remote(url, timeout, limit)
    }
}

/// Stored extension for a sound of the given MIME type; mp3 unless it says
/// wav or ogg.
pub fn sound_format_for_mime(mime: Option<&str>) -> &'static str {
    match mime {
        Some(m) if m.contains("wav") => "wav",
        Some(m) if m.contains("ogg") => "ogg",
        _ => "mp3",
    }
}
