//! Gallery client configuration.
//!
//! Defaults match the values the grid was tuned with; `from_env` lets an
//! embedding shell override the API location and page size.

use std::time::Duration;

use vitrine_shared::constants;

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Base URL of the gallery API.
    /// Env: `VITRINE_API_URL`
    /// Default: `http://127.0.0.1:8080`
    pub api_url: String,

    /// Images per page.
    /// Env: `VITRINE_PAGE_SIZE`
    /// Default: `12`
    pub page_size: usize,

    pub search_debounce: Duration,
    pub load_more_cooldown: Duration,
    pub trigger_delay: Duration,
    pub prefetch_margin_px: f64,
    pub restore_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_url: format!("http://127.0.0.1:{}", constants::DEFAULT_HTTP_PORT),
            page_size: constants::PAGE_SIZE,
            search_debounce: constants::SEARCH_DEBOUNCE,
            load_more_cooldown: constants::LOAD_MORE_COOLDOWN,
            trigger_delay: constants::SCROLL_TRIGGER_DELAY,
            prefetch_margin_px: constants::PREFETCH_MARGIN_PX,
            restore_delay: constants::SCROLL_RESTORE_DELAY,
            request_timeout: constants::REQUEST_TIMEOUT,
        }
    }
}

impl GalleryConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("VITRINE_API_URL") {
            if !url.trim().is_empty() {
                config.api_url = url.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(val) = std::env::var("VITRINE_PAGE_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.page_size = n,
                _ => tracing::warn!(value = %val, "Invalid VITRINE_PAGE_SIZE, using default"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GalleryConfig::default();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.load_more_cooldown, Duration::from_millis(100));
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
    }
}
