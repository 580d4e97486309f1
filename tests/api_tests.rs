mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::Engine as _;
use serde_json::{json, Value};
use tile_studio::{api, FsStore, Studio, StudioConfig};
use tower::ServiceExt;

use common::{png, tiles_image};

fn app(dir: &std::path::Path) -> Router {
    let studio = Studio::new(Arc::new(FsStore::new(dir)), StudioConfig::default());
    api::build_router(Arc::new(studio))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Game "g" with a 4x2-tile tileset and a 3x2 background.
async fn seed(app: &Router) -> (String, String, String) {
    let (status, _) = call(app, "POST", "/api/games", Some(json!({ "name": "g" }))).await;
    assert_eq!(status, StatusCode::OK);

    let url = data_url("image/png", &png(&tiles_image(4, 2)));
    let (status, image) =
        call(app, "POST", "/api/games/g/images/from-url", Some(json!({ "url": url, "name": "tiles" }))).await;
    assert_eq!(status, StatusCode::OK, "{image}");

    let (status, ts) = call(
        app,
        "POST",
        "/api/games/g/tilesets",
        Some(json!({ "name": "terrain", "imageId": image["id"], "tileWidth": 4, "tileHeight": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{ts}");
    assert_eq!(ts["tileCount"], 8);

    let (status, bg) = call(
        app,
        "POST",
        "/api/games/g/backgrounds",
        Some(json!({ "name": "level", "width": 3, "height": 2, "tilesetId": ts["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{bg}");
    (
        ts["id"].as_str().unwrap().to_owned(),
        bg["id"].as_str().unwrap().to_owned(),
        bg["layers"][0]["id"].as_str().unwrap().to_owned(),
    )
}

#[tokio::test]
async fn games_are_created_and_listed() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, body) = call(&app, "POST", "/api/games", Some(json!({ "name": "pong" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "name": "pong" }));

    let (status, body) = call(&app, "POST", "/api/games", Some(json!({ "name": "pong" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "already_exists");

    let (status, body) = call(&app, "POST", "/api/games", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (_, body) = call(&app, "GET", "/api/games", None).await;
    assert_eq!(body, json!(["pong"]));

    let (status, doc) = call(&app, "GET", "/api/games/pong", None).await;
    assert_eq!(status, StatusCode::OK);
    for key in ["images", "sounds", "animations", "objects", "tilesets", "backgrounds"] {
        assert!(doc[key].is_array(), "{key} missing");
    }
}

#[tokio::test]
async fn paint_returns_the_patched_background() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    let (_, bg, layer) = seed(&app).await;

    let uri = format!("/api/games/g/backgrounds/{bg}/paint");
    let (status, body) =
        call(&app, "POST", &uri, Some(json!({ "layerId": layer, "x": 2, "y": 1, "tile": 7 }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["layers"][0]["data"], json!([0, 0, 0, 0, 0, 7]));

    let (status, body) =
        call(&app, "POST", &uri, Some(json!({ "layerId": layer, "x": 0, "y": 0, "tile": 99 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_tile_index");

    let (status, body) =
        call(&app, "POST", &uri, Some(json!({ "layerId": "nope", "x": 0, "y": 0, "tile": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn layer_routes() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    let (_, bg, base) = seed(&app).await;
    let layers = format!("/api/games/g/backgrounds/{bg}/layers");

    let (status, body) = call(&app, "DELETE", &format!("{layers}/{base}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "last_layer");

    let (status, body) = call(&app, "POST", &layers, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["layers"][1]["name"], "Layer 2");
    let top = body["layers"][1]["id"].as_str().unwrap().to_owned();

    let (_, body) = call(&app, "PUT", &format!("{layers}/{top}"), Some(json!({ "name": "fg" }))).await;
    assert_eq!(body["layers"][1]["name"], "fg");

    let (_, body) = call(&app, "POST", &format!("{layers}/{top}/toggle"), None).await;
    assert_eq!(body["layers"][1]["visible"], false);

    let (status, body) = call(&app, "DELETE", &format!("{layers}/{top}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["layers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn render_serves_png() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    let (_, bg, _) = seed(&app).await;

    let req = Request::builder()
        .uri(format!("/api/games/g/backgrounds/{bg}/render"))
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (12, 8));
}

#[tokio::test]
async fn tileset_routes() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    let (ts, bg, _) = seed(&app).await;

    let (status, rect) = call(&app, "GET", &format!("/api/games/g/tilesets/{ts}/tiles/5"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rect, json!({ "x": 0, "y": 4, "w": 4, "h": 4 }));

    let (status, body) = call(&app, "DELETE", &format!("/api/games/g/tilesets/{ts}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "in_use");

    call(&app, "DELETE", &format!("/api/games/g/backgrounds/{bg}"), None).await;
    let (status, _) = call(&app, "DELETE", &format!("/api/games/g/tilesets/{ts}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn whole_document_put_checks_if_match() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    seed(&app).await;

    let (_, mut doc) = call(&app, "GET", "/api/games/g", None).await;
    let version = doc["version"].as_u64().unwrap();
    doc["description"] = json!("edited");

    let put = |if_match: u64, doc: &Value| {
        Request::builder()
            .method("PUT")
            .uri("/api/games/g")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::IF_MATCH, if_match.to_string())
            .body(Body::from(doc.to_string()))
            .unwrap()
    };

    let res = app.clone().oneshot(put(version + 5, &doc)).await.unwrap();
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);

    let res = app.clone().oneshot(put(version, &doc)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let (_, saved) = call(&app, "GET", "/api/games/g", None).await;
    assert_eq!(saved["description"], "edited");
    assert_eq!(saved["version"], version + 1);
}

#[tokio::test]
async fn sound_from_data_url_and_asset_serving() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    call(&app, "POST", "/api/games", Some(json!({ "name": "g" }))).await;

    let url = data_url("audio/ogg", b"OggS fake");
    let (status, sound) = call(&app, "POST", "/api/games/g/sounds/from-url", Some(json!({ "url": url }))).await;
    assert_eq!(status, StatusCode::OK, "{sound}");
    assert_eq!(sound["format"], "ogg");
    assert!(sound["name"].as_str().unwrap().starts_with("generated-"));

    let filename = sound["filename"].as_str().unwrap();
    let req = Request::builder()
        .uri(format!("/assets/g/sounds/{filename}"))
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "audio/ogg");
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OggS fake");

    let (status, body) =
        call(&app, "POST", "/api/games/g/sounds/from-url", Some(json!({ "url": "data:nonsense" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid data URL");
}

#[tokio::test]
async fn multipart_image_upload() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    call(&app, "POST", "/api/games", Some(json!({ "name": "g" }))).await;

    let boundary = "XBOUNDARYX";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"grass.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&png(&tiles_image(3, 1)));
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let req = Request::builder()
        .method("POST")
        .uri("/api/games/g/images")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let image: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(image["name"], "grass");
    assert_eq!((image["width"].as_u64(), image["height"].as_u64()), (Some(12), Some(4)));
    assert!(image["filename"].as_str().unwrap().ends_with(".png"));
    assert!(dir.path().join("g/images").join(image["filename"].as_str().unwrap()).is_file());
}

#[tokio::test]
async fn object_state_routes() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());
    call(&app, "POST", "/api/games", Some(json!({ "name": "g" }))).await;

    let (status, obj) = call(&app, "POST", "/api/games/g/objects", Some(json!({ "name": "coin" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(obj["states"][0]["name"], "default");
    assert_eq!(obj["states"][0]["visualType"], Value::Null);
    let id = obj["id"].as_str().unwrap().to_owned();
    let first = obj["states"][0]["id"].as_str().unwrap().to_owned();

    let (status, body) =
        call(&app, "DELETE", &format!("/api/games/g/objects/{id}/states/{first}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "last_state");

    let (_, obj) =
        call(&app, "POST", &format!("/api/games/g/objects/{id}/states"), Some(json!({ "name": "spin" }))).await;
    assert_eq!(obj["states"].as_array().unwrap().len(), 2);

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/games/g/objects/{id}/states/{first}"),
        Some(json!({ "visualType": "animation", "visualId": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}
