//! Search + pagination state behind the gallery grid.
//!
//! A [`FeedController`] owns the catalog, the search index built over it,
//! the raw and debounced search terms, the filtered view and the page window
//! shown by the grid. It is a cheap handle: clones share the same state, and
//! the debounce and cooldown timers die with the last handle.
//!
//! Filtering is driven only by the debounced term. Every keystroke updates
//! the raw term (so the input can echo it) and pushes the commit back by the
//! debounce delay; only the last term of a burst is ever committed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use vitrine_shared::ImageRecord;

use crate::config::GalleryConfig;
use crate::error::{ClientError, Result};
use crate::scroll::LoadMore;
use crate::search::{FuzzyIndex, SearchIndex};
use crate::timer::ScheduledTask;

/// How much of the filtered view the grid currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page_size: usize,
    current_count: usize,
    has_more: bool,
}

impl PageWindow {
    fn first_page(page_size: usize, total: usize) -> Self {
        let current_count = page_size.min(total);
        Self {
            page_size,
            current_count,
            has_more: current_count < total,
        }
    }

    fn extend(&mut self, total: usize) -> bool {
        if !self.has_more {
            return false;
        }
        self.current_count = (self.current_count + self.page_size).min(total);
        self.has_more = self.current_count < total;
        true
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_count(&self) -> usize {
        self.current_count
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }
}

/// Point-in-time copy of the feed, for rendering and assertions.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub raw_query: String,
    pub debounced_query: String,
    /// The images the grid displays (first `current_count` of the view).
    pub visible: Vec<ImageRecord>,
    /// Length of the filtered view.
    pub total_matches: usize,
    pub catalog_len: usize,
    pub has_more: bool,
    pub loading: bool,
    /// Times the filtered view was recomputed from a committed term.
    pub recomputations: u64,
}

#[derive(Debug, Clone, Copy)]
struct Timing {
    debounce: Duration,
    cooldown: Duration,
}

struct FeedState<I> {
    all: Arc<Vec<ImageRecord>>,
    index: I,
    raw_query: String,
    debounced_query: String,
    filtered: Arc<Vec<ImageRecord>>,
    window: PageWindow,
    loading: bool,
    recomputations: u64,
    debounce: ScheduledTask,
    cooldown: ScheduledTask,
}

impl<I: SearchIndex> FeedState<I> {
    fn refilter(&mut self) {
        self.filtered = match self.index.query(&self.debounced_query) {
            Some(hits) => Arc::new(hits),
            None => self.all.clone(),
        };
        self.window = PageWindow::first_page(self.window.page_size, self.filtered.len());
        self.loading = false;
        self.cooldown.cancel();
        self.recomputations += 1;

        debug!(
            query = %self.debounced_query,
            matches = self.filtered.len(),
            shown = self.window.current_count,
            "feed refiltered"
        );
    }
}

struct Shared<I> {
    state: Mutex<FeedState<I>>,
    timing: Timing,
}

impl<I: SearchIndex> Shared<I> {
    fn lock(&self) -> MutexGuard<'_, FeedState<I>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit_search(&self, term: String) {
        let mut state = self.lock();
        if state.debounced_query == term {
            return;
        }
        state.debounced_query = term;
        state.refilter();
    }

    fn end_cooldown(&self) {
        self.lock().loading = false;
    }
}

pub struct FeedController<I: SearchIndex = FuzzyIndex> {
    shared: Arc<Shared<I>>,
}

impl<I: SearchIndex> Clone for FeedController<I> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl FeedController<FuzzyIndex> {
    /// Feed over `images` using the default fuzzy index.
    pub fn new(images: Vec<ImageRecord>, config: &GalleryConfig) -> Result<Self> {
        Self::with_index(images, config)
    }
}

impl<I: SearchIndex> FeedController<I> {
    /// Feed over `images` with any [`SearchIndex`] implementation.
    pub fn with_index(mut images: Vec<ImageRecord>, config: &GalleryConfig) -> Result<Self> {
        if config.page_size == 0 {
            return Err(ClientError::InvalidPageSize);
        }

        sort_canonical(&mut images);
        let all = Arc::new(images);
        let index = I::build(&all);
        let window = PageWindow::first_page(config.page_size, all.len());

        let state = FeedState {
            filtered: all.clone(),
            all,
            index,
            raw_query: String::new(),
            debounced_query: String::new(),
            window,
            loading: false,
            recomputations: 0,
            debounce: ScheduledTask::new(),
            cooldown: ScheduledTask::new(),
        };

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                timing: Timing {
                    debounce: config.search_debounce,
                    cooldown: config.load_more_cooldown,
                },
            }),
        })
    }

    /// Swap in a new catalog. The index is rebuilt and the current
    /// debounced term re-applied.
    pub fn replace_images(&self, mut images: Vec<ImageRecord>) {
        sort_canonical(&mut images);
        let mut state = self.shared.lock();
        state.all = Arc::new(images);
        state.index = I::build(&state.all);
        state.refilter();
    }

    /// Record a keystroke: echo it now, commit it after the debounce delay.
    pub fn on_search_changed(&self, term: impl Into<String>) {
        let term = term.into();
        let mut state = self.shared.lock();
        state.raw_query = term.clone();

        let weak = Arc::downgrade(&self.shared);
        state.debounce.schedule(self.shared.timing.debounce, async move {
            if let Some(shared) = weak.upgrade() {
                shared.commit_search(term);
            }
        });
    }

    /// Show one more page. Returns `false` (and does nothing) when there is
    /// nothing left or a previous load is still cooling down.
    pub fn on_load_more(&self) -> bool {
        let mut state = self.shared.lock();
        if state.loading || !state.window.has_more {
            return false;
        }

        let total = state.filtered.len();
        state.window.extend(total);
        state.loading = true;

        let weak = Arc::downgrade(&self.shared);
        state.cooldown.schedule(self.shared.timing.cooldown, async move {
            if let Some(shared) = weak.upgrade() {
                shared.end_cooldown();
            }
        });

        debug!(shown = state.window.current_count, total, "loaded next page");
        true
    }

    /// Grow the window until `index` of the filtered view is displayed.
    /// Returns whether it is.
    pub fn ensure_visible(&self, index: usize) -> bool {
        let mut state = self.shared.lock();
        let total = state.filtered.len();
        while index >= state.window.current_count && state.window.extend(total) {}
        index < state.window.current_count
    }

    pub fn window(&self) -> PageWindow {
        self.shared.lock().window
    }

    /// The full filtered view (not just the displayed window).
    pub fn filtered(&self) -> Arc<Vec<ImageRecord>> {
        self.shared.lock().filtered.clone()
    }

    pub fn all_images(&self) -> Arc<Vec<ImageRecord>> {
        self.shared.lock().all.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.lock().loading
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.shared.lock();
        FeedSnapshot {
            raw_query: state.raw_query.clone(),
            debounced_query: state.debounced_query.clone(),
            visible: state.filtered[..state.window.current_count].to_vec(),
            total_matches: state.filtered.len(),
            catalog_len: state.all.len(),
            has_more: state.window.has_more,
            loading: state.loading,
            recomputations: state.recomputations,
        }
    }

    /// Cancel pending debounce and cooldown timers.
    pub fn teardown(&self) {
        let mut state = self.shared.lock();
        state.debounce.cancel();
        state.cooldown.cancel();
        state.loading = false;
    }
}

impl<I: SearchIndex> LoadMore for FeedController<I> {
    fn can_load_more(&self) -> bool {
        let state = self.shared.lock();
        !state.loading && state.window.has_more
    }

    fn load_more(&self) -> bool {
        self.on_load_more()
    }
}

fn sort_canonical(images: &mut [ImageRecord]) {
    images.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
}
