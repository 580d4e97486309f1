use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::StudioError;

impl StudioError {
    pub fn status(&self) -> StatusCode {
        match self {
            StudioError::NotFound { .. } => StatusCode::NOT_FOUND,
            StudioError::Validation(_) | StudioError::InvalidTileIndex { .. } => StatusCode::BAD_REQUEST,
            StudioError::LastLayer
            | StudioError::LastState
            | StudioError::AlreadyExists(_)
            | StudioError::InUse { .. } => StatusCode::CONFLICT,
            StudioError::VersionConflict { .. } => StatusCode::PRECONDITION_FAILED,
            StudioError::Fetch(_) => StatusCode::BAD_GATEWAY,
            StudioError::Io { .. } | StudioError::Json { .. } | StudioError::Image(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for StudioError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{status}: {self}");
        }
        let body = serde_json::json!({ "error": self.to_string(), "kind": self.kind() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(StudioError::not_found("tileset", "t").status(), StatusCode::NOT_FOUND);
        assert_eq!(StudioError::LastLayer.status(), StatusCode::CONFLICT);
        assert_eq!(
            StudioError::VersionConflict { expected: 1, actual: 2 }.status(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(StudioError::Fetch("x".into()).status(), StatusCode::BAD_GATEWAY);
    }
}
