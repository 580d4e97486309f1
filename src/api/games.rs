use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::document::GameDocument;
use crate::error::{Result, StudioError};

pub(super) async fn list(State(studio): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(studio.list_projects()?))
}

#[derive(Deserialize)]
pub(super) struct CreateGame {
    #[serde(default)]
    name: String,
}

pub(super) async fn create(State(studio): State<AppState>, Json(req): Json<CreateGame>) -> Result<Json<Value>> {
    let doc = studio.create_project(&req.name)?;
    Ok(Json(json!({ "success": true, "name": doc.name })))
}

pub(super) async fn get_document(
    State(studio): State<AppState>,
    Path(game): Path<String>,
) -> Result<Json<GameDocument>> {
    Ok(Json(studio.project(&game).document()?))
}

/// Whole-document save. The expected version comes from `If-Match`, or from
/// the body's own `version` when the header is absent.
pub(super) async fn put_document(
    State(studio): State<AppState>,
    Path(game): Path<String>,
    headers: HeaderMap,
    Json(doc): Json<GameDocument>,
) -> Result<Json<Value>> {
    let expected = match if_match(&headers)? {
        Some(v) => Some(v),
        None if doc.version > 0 => Some(doc.version),
        None => None,
    };
    let version = studio.project(&game).replace_document(doc, expected)?;
    Ok(Json(json!({ "success": true, "version": version })))
}

fn if_match(headers: &HeaderMap) -> Result<Option<u64>> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };
    let text = value
        .to_str()
        .map_err(|_| StudioError::Validation("If-Match is not valid text".into()))?;
    let text = text.trim().trim_start_matches("W/").trim_matches('"');
    text.parse()
        .map(Some)
        .map_err(|_| StudioError::Validation(format!("If-Match '{text}' is not a version number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn if_match_accepts_quoted_versions() {
        let mut h = HeaderMap::new();
        assert_eq!(if_match(&h).unwrap(), None);
        h.insert(header::IF_MATCH, HeaderValue::from_static("\"7\""));
        assert_eq!(if_match(&h).unwrap(), Some(7));
        h.insert(header::IF_MATCH, HeaderValue::from_static("*"));
        assert!(if_match(&h).is_err());
    }
}
