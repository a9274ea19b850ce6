//! Gallery state core: everything between the gallery API and a UI shell.

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod feed;
pub mod last_viewed;
pub mod restore;
pub mod route;
pub mod scroll;
pub mod search;
pub mod session;
pub mod timer;
pub mod viewer;

pub use api::GalleryApi;
pub use config::GalleryConfig;
pub use error::{ClientError, Result};
pub use feed::{FeedController, FeedSnapshot, PageWindow};
pub use route::Route;
pub use search::{FuzzyIndex, SearchIndex};
pub use session::{GallerySession, LoadState, Notice, RouteOutcome};
pub use viewer::{Direction, Key, Swipe, Viewer, ViewerAction};

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;
    use vitrine_shared::{ImageId, ImageRecord};

    pub fn record(id: &str, code: &str, number: i64) -> ImageRecord {
        ImageRecord {
            id: ImageId::from(id),
            code: code.into(),
            number,
            url: format!("https://cdn.example/{id}.jpg"),
            folder: "f".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// `n` images `img-000..` with codes `S-10000..` and numbers `0..n`.
    pub fn catalog(n: usize) -> Vec<ImageRecord> {
        (0..n)
            .map(|i| record(&format!("img-{i:03}"), &format!("S-{}", 10000 + i), i as i64))
            .collect()
    }
}
