use std::time::Duration;

/// Application name
pub const APP_NAME: &str = "Vitrine";

/// Images added to the grid per page / per "load more"
pub const PAGE_SIZE: usize = 12;

/// Delay after the last keystroke before a search term is committed
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Window during which a second "load more" is ignored
pub const LOAD_MORE_COOLDOWN: Duration = Duration::from_millis(100);

/// Delay between the sentinel becoming visible and the load firing
pub const SCROLL_TRIGGER_DELAY: Duration = Duration::from_millis(50);

/// Distance (px) ahead of the viewport at which the sentinel counts as visible
pub const PREFETCH_MARGIN_PX: f64 = 400.0;

/// Delay before scrolling the last viewed image back into view
pub const SCROLL_RESTORE_DELAY: Duration = Duration::from_millis(100);

/// Caller-side bound on any request to the gallery API
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound on a single catalog query inside the server
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifetime of the server's cached image list
pub const CATALOG_CACHE_TTL: Duration = Duration::from_secs(60);

/// Fuzzy matches below this confidence (0..=1) are dropped
pub const MIN_CONFIDENCE: f64 = 0.6;

/// Thumbnails shown in the viewer's strip
pub const THUMBNAIL_STRIP_LEN: usize = 8;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;
