use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{success, AppState};
use crate::assets::GameObject;
use crate::error::Result;
use crate::project::StatePatch;

#[derive(Deserialize)]
pub(super) struct Named {
    #[serde(default)]
    name: String,
}

pub(super) async fn create_object(
    State(studio): State<AppState>,
    Path(game): Path<String>,
    Json(req): Json<Named>,
) -> Result<Json<GameObject>> {
    Ok(Json(studio.project(&game).create_object(&req.name)?))
}

pub(super) async fn rename_object(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
    Json(req): Json<Named>,
) -> Result<Json<GameObject>> {
    Ok(Json(studio.project(&game).rename_object(&id, &req.name)?))
}

pub(super) async fn delete_object(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    studio.project(&game).delete_object(&id)?;
    Ok(success())
}

pub(super) async fn add_state(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
    Json(req): Json<Named>,
) -> Result<Json<GameObject>> {
    Ok(Json(studio.project(&game).add_state(&id, &req.name)?))
}

pub(super) async fn update_state(
    State(studio): State<AppState>,
    Path((game, id, state_id)): Path<(String, String, String)>,
    Json(patch): Json<StatePatch>,
) -> Result<Json<GameObject>> {
    Ok(Json(studio.project(&game).update_state(&id, &state_id, patch)?))
}

pub(super) async fn delete_state(
    State(studio): State<AppState>,
    Path((game, id, state_id)): Path<(String, String, String)>,
) -> Result<Json<GameObject>> {
    Ok(Json(studio.project(&game).delete_state(&id, &state_id)?))
}
