use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{success, AppState};
use crate::assets::{Animation, ImageAsset, SoundAsset};
use crate::error::{Result, StudioError};
use crate::fetch::{self, Fetched};
use crate::project::{AnimationPatch, NewAnimation};

/// The file part of an upload plus the optional `name` text field.
struct Upload {
    name: Option<String>,
    filename: String,
    bytes: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart, file_field: &str) -> Result<Upload> {
    let bad = |e: axum::extract::multipart::MultipartError| StudioError::Validation(e.body_text());
    let mut name = None;
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await.map_err(bad)?),
            Some(f) if f == file_field => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(bad)?;
                file = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }
    let (filename, bytes) =
        file.ok_or_else(|| StudioError::Validation(format!("multipart field '{file_field}' is required")))?;
    Ok(Upload { name, filename, bytes })
}

pub(super) async fn upload_image(
    State(studio): State<AppState>,
    Path(game): Path<String>,
    multipart: Multipart,
) -> Result<Json<ImageAsset>> {
    let up = read_upload(multipart, "image").await?;
    let image = studio
        .project(&game)
        .add_image(up.name.as_deref(), &up.filename, &up.bytes)?;
    Ok(Json(image))
}

pub(super) async fn upload_sound(
    State(studio): State<AppState>,
    Path(game): Path<String>,
    multipart: Multipart,
) -> Result<Json<SoundAsset>> {
    let up = read_upload(multipart, "sound").await?;
    let sound = studio
        .project(&game)
        .add_sound(up.name.as_deref(), &up.filename, &up.bytes)?;
    Ok(Json(sound))
}

#[derive(Deserialize)]
pub(super) struct FromUrl {
    #[serde(default)]
    url: String,
    name: Option<String>,
}

async fn load_url(studio: &AppState, url: String) -> Result<Fetched> {
    let timeout = studio.config().fetch_timeout;
    let limit = studio.config().max_upload_bytes;
    tokio::task::spawn_blocking(move || fetch::load(&url, timeout, limit))
        .await
        .map_err(|e| StudioError::Fetch(e.to_string()))?
}

pub(super) async fn image_from_url(
    State(studio): State<AppState>,
    Path(game): Path<String>,
    Json(req): Json<FromUrl>,
) -> Result<Json<ImageAsset>> {
    let fetched = load_url(&studio, req.url).await?;
    let image = studio
        .project(&game)
        .add_image_as_png(req.name.as_deref(), &fetched.bytes)?;
    Ok(Json(image))
}

pub(super) async fn sound_from_url(
    State(studio): State<AppState>,
    Path(game): Path<String>,
    Json(req): Json<FromUrl>,
) -> Result<Json<SoundAsset>> {
    let fetched = load_url(&studio, req.url).await?;
    let format = fetch::sound_format_for_mime(fetched.mime.as_deref());
    let sound = studio
        .project(&game)
        .add_sound_with_format(req.name.as_deref(), format, &fetched.bytes)?;
    Ok(Json(sound))
}

pub(super) async fn delete_image(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    studio.project(&game).delete_image(&id)?;
    Ok(success())
}

pub(super) async fn delete_sound(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    studio.project(&game).delete_sound(&id)?;
    Ok(success())
}

pub(super) async fn create_animation(
    State(studio): State<AppState>,
    Path(game): Path<String>,
    Json(req): Json<NewAnimation>,
) -> Result<Json<Animation>> {
    Ok(Json(studio.project(&game).create_animation(req)?))
}

pub(super) async fn update_animation(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
    Json(patch): Json<AnimationPatch>,
) -> Result<Json<Animation>> {
    Ok(Json(studio.project(&game).update_animation(&id, patch)?))
}

pub(super) async fn delete_animation(
    State(studio): State<AppState>,
    Path((game, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    studio.project(&game).delete_animation(&id)?;
    Ok(success())
}
