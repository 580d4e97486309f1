use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use super::AppState;
use crate::error::{Result, StudioError};
use crate::store::AssetFolder;

/// Raw asset file of a project, e.g. `/assets/pong/images/<id>.png`.
pub(super) async fn serve(
    State(studio): State<AppState>,
    Path((game, folder, filename)): Path<(String, String, String)>,
) -> Result<impl IntoResponse> {
    let folder = AssetFolder::parse(&folder).ok_or_else(|| StudioError::not_found("asset folder", folder.clone()))?;
    let bytes = studio.project(&game).read_asset(folder, &filename)?;
    Ok(([(header::CONTENT_TYPE, content_type(&filename))], bytes))
}

fn content_type(filename: &str) -> &'static str {
    let ext = filename.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::content_type;

    #[test]
    fn guesses_from_extension() {
        assert_eq!(content_type("a.PNG"), "image/png");
        assert_eq!(content_type("b.ogg"), "audio/ogg");
        assert_eq!(content_type("noext"), "application/octet-stream");
    }
}
