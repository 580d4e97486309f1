use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{success, AppState};
use crate::background::Background;
use crate::error::{Result, StudioError};
use crate::project::BackgroundPatch;
use crate::tileset::{TileRect, Tileset};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewTileset {
    #[serde(default)]
    name: String,
    image_id: String,
    tile_width: u32,
    tile_height: u32,
}

pub(super) async fn create_tileset(
    State(studio): State<AppState>,
    Path(game): Path<String>,
    Json(req): Json<NewTileset>,
) -> Result<Json<Tileset>> {
    let tileset = studio
        .project(&game)
        .create_tileset(&req.name, &req.image_id, req.tile_width, req.tile_height)?;
    Ok(Json(tileset))
}

pub(super) async fn tile_rect(
    State(studio): State<AppState>,
    Path((game, id, index)): Path<(String, String, u32)>,
) -> Result<Json<TileRect>> {
    Ok(Json(studio.project(&game).tile_rect(&id, index)?))
}

pub(super) async fn delete_tileset(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    studio.project(&game).delete_tileset(&id)?;
    Ok(success())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewBackground {
    #[serde(default)]
    name: String,
    width: u32,
    height: u32,
    tileset_id: String,
}

pub(super) async fn create_background(
    State(studio): State<AppState>,
    Path(game): Path<String>,
    Json(req): Json<NewBackground>,
) -> Result<Json<Background>> {
    let bg = studio
        .project(&game)
        .create_background(&req.name, req.width, req.height, &req.tileset_id)?;
    Ok(Json(bg))
}

pub(super) async fn update_background(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
    Json(patch): Json<BackgroundPatch>,
) -> Result<Json<Background>> {
    Ok(Json(studio.project(&game).update_background(&id, patch)?))
}

pub(super) async fn delete_background(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    studio.project(&game).delete_background(&id)?;
    Ok(success())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PaintRequest {
    layer_id: String,
    x: i32,
    y: i32,
    tile: u32,
}

pub(super) async fn paint(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
    Json(req): Json<PaintRequest>,
) -> Result<Json<Background>> {
    let bg = studio
        .project(&game)
        .paint_tile(&id, &req.layer_id, req.x, req.y, req.tile)?;
    Ok(Json(bg))
}

pub(super) async fn render(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let png = studio.project(&game).render_background(&id)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

#[derive(Deserialize)]
pub(super) struct LayerName {
    name: Option<String>,
}

pub(super) async fn add_layer(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Background>> {
    // The body is optional here; an empty one means "default name".
    let name = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<LayerName>(&body)
            .map_err(|e| StudioError::Validation(format!("invalid layer body: {e}")))?
            .name
    };
    Ok(Json(studio.project(&game).add_layer(&id, name)?))
}

pub(super) async fn rename_layer(
    State(studio): State<AppState>,
    Path((game, id, layer_id)): Path<(String, String, String)>,
    Json(body): Json<LayerName>,
) -> Result<Json<Background>> {
    let name = body.name.unwrap_or_default();
    Ok(Json(studio.project(&game).rename_layer(&id, &layer_id, &name)?))
}

pub(super) async fn toggle_layer(
    State(studio): State<AppState>,
    Path((game, id, layer_id)): Path<(String, String, String)>,
) -> Result<Json<Background>> {
    Ok(Json(studio.project(&game).toggle_layer_visibility(&id, &layer_id)?))
}

pub(super) async fn delete_layer(
    State(studio): State<AppState>,
    Path((game, id, layer_id)): Path<(String, String, String)>,
) -> Result<Json<Background>> {
    Ok(Json(studio.project(&game).delete_layer(&id, &layer_id)?))
}
