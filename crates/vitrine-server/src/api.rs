use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, Extensions, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use vitrine_shared::{ApiResponse, ImageId, NewStorageRequest};

use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::throttle::{client_ip, SubmissionThrottle};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub throttle: SubmissionThrottle,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/images", get(list_images))
        .route("/api/images/{id}", get(get_image))
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
        .route("/api/storage-requests", post(create_storage_request))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_images(State(state): State<AppState>) -> Result<Response, ServerError> {
    let images = state.catalog.list().await?;
    Ok(Json(images.as_slice()).into_response())
}

async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    let image = state.catalog.get(ImageId::from(id)).await?;
    Ok(Json(image).into_response())
}

async fn create_storage_request(
    State(state): State<AppState>,
    extensions: Extensions,
    headers: HeaderMap,
    payload: Result<Json<NewStorageRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(form) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let valid = form.validate()?;
    state
        .throttle
        .admit(client_ip(&extensions, &headers), &valid)?;

    let request = state.catalog.create_storage_request(valid).await?;
    info!(id = %request.id, code = %request.image_code, "storage request recorded");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(request))).into_response())
}

async fn sitemap(State(state): State<AppState>) -> Response {
    let domain = &state.config.public_domain;
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    let _ = writeln!(xml, "  <url><loc>{}/</loc></url>", xml_escape(domain));

    match state.catalog.list().await {
        Ok(images) => {
            for image in images.iter() {
                let _ = writeln!(
                    xml,
                    "  <url><loc>{}/i/{}</loc><lastmod>{}</lastmod></url>",
                    xml_escape(domain),
                    xml_escape(image.id.as_str()),
                    image.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                );
            }
        }
        Err(e) => warn!(error = %e, "sitemap without image entries"),
    }
    xml.push_str("</urlset>\n");

    ([(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}

async fn robots(State(state): State<AppState>) -> Response {
    let body = format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n",
        state.config.public_domain
    );
    ([(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(listener, state).await
}

pub async fn serve_on(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %listener.local_addr()?, "Starting HTTP API server");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
