//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use vitrine_shared::constants;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `vitrine.db` in the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Public origin used for sitemap and robots.txt URLs.
    /// Env: `PUBLIC_DOMAIN`
    /// Default: `http://localhost:8080`
    pub public_domain: String,

    /// How long a fetched image list is served before refreshing.
    /// Env: `CACHE_TTL_SECS`
    /// Default: `60`
    pub cache_ttl: Duration,

    /// Upper bound on one catalog query.
    /// Env: `STORE_TIMEOUT_SECS`
    /// Default: `5`
    pub store_timeout: Duration,

    /// JSON array of images upserted into the catalog at startup.
    /// Env: `SEED_PATH`
    /// Default: none.
    pub seed_path: Option<PathBuf>,

    /// Storage requests accepted per client IP within `form_window`.
    /// Env: `FORM_LIMIT`
    /// Default: `5`
    pub form_limit: usize,

    /// Window for the per-client limit and for duplicate detection.
    /// Env: `FORM_WINDOW_SECS`
    /// Default: `3600`
    pub form_window: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], constants::DEFAULT_HTTP_PORT).into(),
            database_path: None,
            public_domain: format!("http://localhost:{}", constants::DEFAULT_HTTP_PORT),
            cache_ttl: constants::CATALOG_CACHE_TTL,
            store_timeout: constants::STORE_TIMEOUT,
            seed_path: None,
            form_limit: 5,
            form_window: Duration::from_secs(3600),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            if !path.is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(domain) = std::env::var("PUBLIC_DOMAIN") {
            let domain = domain.trim().trim_end_matches('/');
            if !domain.is_empty() {
                config.public_domain = domain.to_string();
            }
        }

        if let Some(secs) = parse_var::<u64>("CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_var::<u64>("STORE_TIMEOUT_SECS") {
            if secs > 0 {
                config.store_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(path) = std::env::var("SEED_PATH") {
            if !path.is_empty() {
                config.seed_path = Some(PathBuf::from(path));
            }
        }

        if let Some(limit) = parse_var::<usize>("FORM_LIMIT") {
            config.form_limit = limit;
        }

        if let Some(secs) = parse_var::<u64>("FORM_WINDOW_SECS") {
            config.form_window = Duration::from_secs(secs);
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let val = std::env::var(name).ok()?;
    match val.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(var = name, value = %val, "Invalid value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert!(config.seed_path.is_none());
        assert_eq!(config.form_limit, 5);
        assert_eq!(config.form_window, Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        std::env::set_var("VITRINE_TEST_PARSE_VAR", "abc");
        assert_eq!(parse_var::<u64>("VITRINE_TEST_PARSE_VAR"), None);
        std::env::set_var("VITRINE_TEST_PARSE_VAR", " 42 ");
        assert_eq!(parse_var::<u64>("VITRINE_TEST_PARSE_VAR"), Some(42));
        std::env::remove_var("VITRINE_TEST_PARSE_VAR");
    }
}
