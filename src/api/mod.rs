//! HTTP surface of the studio.
//!
//! Handlers are thin: they pull ids and bodies out of the request, call the
//! matching [`Project`](crate::project::Project) operation and return its
//! result as JSON. Failures turn into `{error, kind}` bodies.

mod assets;
mod error;
mod games;
mod media;
mod objects;
mod tiles;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::project::Studio;

/// Shared handler state.
pub type AppState = Arc<Studio>;

/// `{"success": true}`
fn success() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "success": true }))
}

pub fn build_router(studio: AppState) -> Router {
    let body_limit = studio.config().max_upload_bytes;

    let api = Router::new()
        .route("/games", get(games::list).post(games::create))
        .route("/games/{game}", get(games::get_document).put(games::put_document))
        .route("/games/{game}/images", post(media::upload_image))
        .route("/games/{game}/images/from-url", post(media::image_from_url))
        .route("/games/{game}/images/{id}", delete(media::delete_image))
        .route("/games/{game}/sounds", post(media::upload_sound))
        .route("/games/{game}/sounds/from-url", post(media::sound_from_url))
        .route("/games/{game}/sounds/{id}", delete(media::delete_sound))
        .route("/games/{game}/animations", post(media::create_animation))
        .route(
            "/games/{game}/animations/{id}",
            put(media::update_animation).delete(media::delete_animation),
        )
        .route("/games/{game}/tilesets", post(tiles::create_tileset))
        .route("/games/{game}/tilesets/{id}", delete(tiles::delete_tileset))
        .route("/games/{game}/tilesets/{id}/tiles/{index}", get(tiles::tile_rect))
        .route("/games/{game}/backgrounds", post(tiles::create_background))
        .route(
            "/games/{game}/backgrounds/{id}",
            put(tiles::update_background).delete(tiles::delete_background),
        )
        .route("/games/{game}/backgrounds/{id}/paint", post(tiles::paint))
        .route("/games/{game}/backgrounds/{id}/render", get(tiles::render))
        .route("/games/{game}/backgrounds/{id}/layers", post(tiles::add_layer))
        .route(
            "/games/{game}/backgrounds/{id}/layers/{layer_id}",
            put(tiles::rename_layer).delete(tiles::delete_layer),
        )
        .route(
            "/games/{game}/backgrounds/{id}/layers/{layer_id}/toggle",
            post(tiles::toggle_layer),
        )
        .route("/games/{game}/objects", post(objects::create_object))
        .route(
            "/games/{game}/objects/{id}",
            put(objects::rename_object).delete(objects::delete_object),
        )
        .route("/games/{game}/objects/{id}/states", post(objects::add_state))
        .route(
            "/games/{game}/objects/{id}/states/{state_id}",
            put(objects::update_state).delete(objects::delete_state),
        );

    Router::new()
        .nest("/api", api)
        .route("/assets/{game}/{folder}/{filename}", get(assets::serve))
        .with_state(studio)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(studio: AppState) -> anyhow::Result<()> {
    let addr = studio.config().addr();
    let app = build_router(studio);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("tile studio listening on http://{addr}");
    axum::serve(listener, app).await.context("server stopped")?;
    Ok(())
}
