//! Drives a session against a small in-process gallery API.

use std::net::SocketAddr;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;

use vitrine_client::{
    ClientError, GalleryApi, GalleryConfig, GallerySession, LoadState, Notice, Route,
    RouteOutcome,
};
use vitrine_shared::{ImageId, ImageRecord, NewStorageRequest};

fn images(base: &str) -> Vec<ImageRecord> {
    (0..30)
        .map(|i| ImageRecord {
            id: ImageId::from(format!("img-{i:03}")),
            code: format!("S-{}", 20000 + i),
            number: i,
            url: format!("{base}/assets/img-{i:03}.jpg"),
            folder: "2024".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .collect()
}

async fn serve() -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base = format!("http://{addr}");

    let catalog = images(&base);
    let by_id = catalog.clone();
    let app = Router::new()
        .route("/api/images", get(move || async move { Json(catalog) }))
        .route(
            "/api/images/{id}",
            get(move |Path(id): Path<String>| async move {
                match by_id.into_iter().find(|image| image.id.as_str() == id) {
                    Some(image) => Json(image).into_response(),
                    None => (
                        StatusCode::NOT_FOUND,
                        Json(json!({"success": false, "error": "Image not found"})),
                    )
                        .into_response(),
                }
            }),
        )
        .route(
            "/assets/{name}",
            get(|Path(name): Path<String>| async move {
                if name == "img-013.jpg" {
                    (StatusCode::OK, b"jpeg bytes".to_vec()).into_response()
                } else {
                    StatusCode::NOT_FOUND.into_response()
                }
            }),
        )
        .route(
            "/api/storage-requests",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"success": false, "error": "Too many requests"})),
                )
            }),
        );

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base, handle)
}

fn api(base: &str) -> GalleryApi {
    GalleryApi::new(&GalleryConfig {
        api_url: base.to_string(),
        ..GalleryConfig::default()
    })
}

#[tokio::test]
async fn mount_open_and_download() {
    let (base, server) = serve().await;
    let api = api(&base);
    let mut session = GallerySession::new(&GalleryConfig::default()).unwrap();

    assert_eq!(session.mount(&api).await, &LoadState::Ready);
    let snap = session.feed().snapshot();
    assert_eq!(snap.catalog_len, 30);
    assert_eq!(snap.visible.len(), 12);

    let route = Route::parse("/i/img-013").unwrap();
    assert_eq!(session.navigate(&route), RouteOutcome::Opened(13));

    let dir = tempfile::tempdir().unwrap();
    let saved = session.download_current(&api, dir.path()).await.unwrap();
    assert_eq!(saved, dir.path().join("S-20013.jpg"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"jpeg bytes");
    assert!(matches!(
        session.take_notices().as_slice(),
        [Notice::Downloaded(_)]
    ));

    // Only the saved file remains in the directory.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    server.abort();
}

#[tokio::test]
async fn failed_download_keeps_viewer_open() {
    let (base, server) = serve().await;
    let api = api(&base);
    let mut session = GallerySession::new(&GalleryConfig::default()).unwrap();
    session.mount(&api).await;
    session.open_index(2).unwrap();

    let dir = tempfile::tempdir().unwrap();
    assert!(session.download_current(&api, dir.path()).await.is_none());
    assert!(session.viewer().is_open());
    assert!(matches!(
        session.take_notices().as_slice(),
        [Notice::DownloadFailed(_)]
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    server.abort();
}

#[tokio::test]
async fn get_image_maps_404_to_none() {
    let (base, server) = serve().await;
    let api = api(&base);

    let found = api.get_image(&ImageId::from("img-004")).await.unwrap();
    assert_eq!(found.map(|image| image.code), Some("S-20004".to_string()));
    assert!(api.get_image(&ImageId::from("missing")).await.unwrap().is_none());

    server.abort();
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let (base, server) = serve().await;
    let api = api(&base);
    let form = NewStorageRequest {
        email: "Someone@Example.com".into(),
        image_code: "S-20001".into(),
        reason: "wedding photos".into(),
    };

    match api.submit_storage_request(&form).await {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "Too many requests");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    server.abort();
}

#[tokio::test]
async fn unreachable_api_fails_mount() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let mut session = GallerySession::new(&GalleryConfig::default()).unwrap();
    let state = session.mount(&api(&base)).await.clone();
    assert!(matches!(state, LoadState::Failed(_)));
    assert!(session.feed().snapshot().visible.is_empty());
}
