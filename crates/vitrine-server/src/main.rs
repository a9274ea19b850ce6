//! # vitrine-server
//!
//! HTTP service for the gallery.
//!
//! This binary provides:
//! - **Catalog API** (`/api/images`, `/api/images/{id}`) backed by SQLite,
//!   with a cached image list that degrades to the last good copy
//! - **Storage requests** (`/api/storage-requests`), validated and persisted,
//!   limited per client IP with duplicate submissions refused
//! - **Crawler endpoints** (`/sitemap.xml`, `/robots.txt`) and `/health`

mod api;
mod catalog;
mod config;
mod error;
mod throttle;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use vitrine_shared::constants::APP_NAME;
use vitrine_store::Database;

use crate::api::AppState;
use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::throttle::SubmissionThrottle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,vitrine_server=debug")),
        )
        .init();

    info!("Starting {} server v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the catalog database and apply the seed file
    // -----------------------------------------------------------------------
    let mut db = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };
    info!(path = ?db.path(), "Database opened");

    if let Some(seed) = &config.seed_path {
        let count = db.seed_images_from_file(seed)?;
        info!(path = %seed.display(), count, "Catalog seeded");
    }

    let catalog = Catalog::new(db, config.cache_ttl, config.store_timeout);
    let throttle = SubmissionThrottle::new(config.form_limit, config.form_window);

    let app_state = AppState {
        catalog,
        throttle,
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
