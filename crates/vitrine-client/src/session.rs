//! One mounted gallery page.
//!
//! A [`GallerySession`] wires the feed, the infinite-scroll trigger, the
//! viewer and scroll restoration together and holds the load state of the
//! catalog. A UI shell forwards its events here and renders from
//! [`GallerySession::feed`] and [`GallerySession::viewer`].

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use vitrine_shared::constants::THUMBNAIL_STRIP_LEN;
use vitrine_shared::{ImageId, ImageRecord, NewStorageRequest, StorageRequest};

use crate::api::GalleryApi;
use crate::config::GalleryConfig;
use crate::download::download_image;
use crate::error::Result;
use crate::feed::FeedController;
use crate::last_viewed::{slot, LastViewed, LastViewedReader};
use crate::restore::ScrollRestorer;
use crate::route::Route;
use crate::scroll::{ScrollGeometry, ScrollTrigger};
use crate::viewer::{Key, Swipe, Viewer, ViewerAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// The catalog couldn't be fetched; the grid is empty and shows a retry.
    Failed(String),
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Downloaded(PathBuf),
    DownloadFailed(String),
    StorageRequestSent(String),
    StorageRequestFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Grid,
    Opened(usize),
    NotFound,
}

type ScrollHandler = Arc<dyn Fn(LastViewed) + Send + Sync>;

pub struct GallerySession {
    state: LoadState,
    feed: FeedController,
    trigger: ScrollTrigger<FeedController>,
    viewer: Viewer,
    last_viewed: LastViewedReader,
    restorer: ScrollRestorer,
    on_scroll: ScrollHandler,
    notices: Vec<Notice>,
}

impl GallerySession {
    pub fn new(config: &GalleryConfig) -> Result<Self> {
        let feed = FeedController::new(Vec::new(), config)?;
        let (writer, reader) = slot();

        Ok(Self {
            state: LoadState::Loading,
            trigger: ScrollTrigger::new(feed.clone(), config),
            feed,
            viewer: Viewer::new(writer),
            last_viewed: reader,
            restorer: ScrollRestorer::new(config),
            on_scroll: Arc::new(|_| {}),
            notices: Vec::new(),
        })
    }

    /// Called with the grid position to scroll to when returning from the
    /// viewer.
    pub fn set_scroll_handler(&mut self, handler: impl Fn(LastViewed) + Send + Sync + 'static) {
        self.on_scroll = Arc::new(handler);
    }

    /// Fetch the catalog and populate the feed.
    pub async fn mount(&mut self, api: &GalleryApi) -> &LoadState {
        self.state = LoadState::Loading;
        let result = api.list_images().await;
        self.mount_with(result)
    }

    /// Populate the feed from an already fetched catalog result.
    pub fn mount_with(&mut self, result: Result<Vec<ImageRecord>>) -> &LoadState {
        match result {
            Ok(images) => {
                info!(count = images.len(), "gallery mounted");
                self.feed.replace_images(images);
                self.state = LoadState::Ready;
            }
            Err(e) => {
                error!(error = %e, "failed to load gallery");
                self.feed.replace_images(Vec::new());
                self.state = LoadState::Failed(e.to_string());
            }
        }
        &self.state
    }

    pub async fn retry(&mut self, api: &GalleryApi) -> &LoadState {
        self.mount(api).await
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn feed(&self) -> &FeedController {
        &self.feed
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Thumbnail indices for the viewer's strip.
    pub fn thumbnail_strip(&self) -> Range<usize> {
        self.viewer.thumbnail_window(THUMBNAIL_STRIP_LEN)
    }

    pub fn search(&self, term: impl Into<String>) {
        self.feed.on_search_changed(term);
    }

    pub fn observe_scroll(&mut self, geometry: ScrollGeometry) {
        self.trigger.observe(geometry);
    }

    pub fn sentinel_visibility(&mut self, visible: bool) {
        self.trigger.on_visibility_changed(visible);
    }

    /// Where the page currently is.
    pub fn route(&self) -> Route {
        match self.viewer.current() {
            Some(image) => Route::Image(image.id.clone()),
            None => Route::Grid,
        }
    }

    pub fn navigate(&mut self, route: &Route) -> RouteOutcome {
        match route {
            Route::Grid => {
                self.close_viewer();
                RouteOutcome::Grid
            }
            Route::Image(id) => self.open_image(id),
        }
    }

    /// Open the grid card at `index` of the filtered view.
    pub fn open_index(&mut self, index: usize) -> Result<RouteOutcome> {
        self.viewer.open(self.feed.filtered(), index)?;
        Ok(RouteOutcome::Opened(index))
    }

    fn open_image(&mut self, id: &ImageId) -> RouteOutcome {
        // The displayed view first; a deep link to a filtered-out image
        // falls back to the full catalog.
        for list in [self.feed.filtered(), self.feed.all_images()] {
            if let Some(index) = list.iter().position(|image| &image.id == id) {
                return match self.viewer.open(list, index) {
                    Ok(_) => RouteOutcome::Opened(index),
                    Err(_) => RouteOutcome::NotFound,
                };
            }
        }

        warn!(%id, "image not found");
        RouteOutcome::NotFound
    }

    /// Close the viewer and scroll the grid back to the last viewed image.
    pub fn close_viewer(&mut self) -> Option<LastViewed> {
        self.viewer.close()?;
        self.restore_scroll()
    }

    pub fn handle_key(&mut self, key: Key) -> ViewerAction {
        let action = self.viewer.handle_key(key);
        if action == ViewerAction::Closed {
            self.restore_scroll();
        }
        action
    }

    pub fn handle_swipe(&mut self, swipe: Swipe) -> ViewerAction {
        self.viewer.handle_swipe(swipe)
    }

    fn restore_scroll(&mut self) -> Option<LastViewed> {
        let handler = self.on_scroll.clone();
        self.restorer
            .restore(&self.last_viewed, &self.feed, move |viewed| handler(viewed))
    }

    /// Save the image shown in the viewer into `dest_dir`. Failures become a
    /// notice; the viewer stays open either way.
    pub async fn download_current(&mut self, api: &GalleryApi, dest_dir: &Path) -> Option<PathBuf> {
        let image = self.viewer.current()?.clone();

        match download_image(api.http(), &image, dest_dir, api.timeout()).await {
            Ok(path) => {
                self.notices.push(Notice::Downloaded(path.clone()));
                Some(path)
            }
            Err(e) => {
                error!(id = %image.id, error = %e, "download failed");
                self.notices.push(Notice::DownloadFailed(e.to_string()));
                None
            }
        }
    }

    pub async fn submit_storage_request(
        &mut self,
        api: &GalleryApi,
        form: &NewStorageRequest,
    ) -> Result<StorageRequest> {
        match api.submit_storage_request(form).await {
            Ok(request) => {
                self.notices
                    .push(Notice::StorageRequestSent(request.image_code.clone()));
                Ok(request)
            }
            Err(e) => {
                warn!(error = %e, "storage request not sent");
                self.notices.push(Notice::StorageRequestFailed(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Cancel every pending timer (debounce, cooldown, scroll fire, restore).
    pub fn teardown(&mut self) {
        self.feed.teardown();
        self.trigger.teardown();
        self.restorer.teardown();
    }
}

impl Drop for GallerySession {
    fn drop(&mut self) {
        self.teardown();
    }
}
