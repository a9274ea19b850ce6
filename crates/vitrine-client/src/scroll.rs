//! Infinite-scroll trigger.
//!
//! The grid ends with a sentinel element. The trigger watches its position
//! relative to the viewport (with a generous pre-fetch margin) and asks its
//! target for one more page when the sentinel comes into range. Visibility
//! flicker is coalesced by a short delay, and the trigger never fires twice
//! within the cooldown window no matter how many signals arrive.
//!
//! While the sentinel stays in range the trigger keeps watching: a target
//! that was busy, or that grew new pages after a search, is asked again once
//! the cooldown has passed. Only leaving the range or teardown stops it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::config::GalleryConfig;
use crate::timer::ScheduledTask;

/// Lower bound on the re-check interval of an armed trigger.
const MIN_RECHECK: Duration = Duration::from_millis(10);

/// Something that can grow by one page.
pub trait LoadMore: Send + Sync + 'static {
    /// Whether a load would currently do anything.
    fn can_load_more(&self) -> bool;

    /// Load one page. Returns `true` if anything was loaded.
    fn load_more(&self) -> bool;
}

/// Scroll position of the container and where the sentinel sits in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollGeometry {
    pub scroll_top: f64,
    pub viewport_height: f64,
    /// Offset of the sentinel's top edge from the top of the content.
    pub sentinel_top: f64,
}

impl ScrollGeometry {
    /// Whether the sentinel is within `margin` px below the viewport's
    /// bottom edge (or anywhere above it).
    pub fn sentinel_in_range(&self, margin: f64) -> bool {
        self.sentinel_top <= self.scroll_top + self.viewport_height + margin
    }
}

pub struct ScrollTrigger<L: LoadMore> {
    target: Arc<L>,
    margin: f64,
    delay: Duration,
    cooldown: Duration,
    visible: Arc<AtomicBool>,
    pending: ScheduledTask,
    last_fired: Arc<Mutex<Option<Instant>>>,
}

impl<L: LoadMore> ScrollTrigger<L> {
    pub fn new(target: L, config: &GalleryConfig) -> Self {
        Self {
            target: Arc::new(target),
            margin: config.prefetch_margin_px,
            delay: config.trigger_delay,
            cooldown: config.load_more_cooldown,
            visible: Arc::new(AtomicBool::new(false)),
            pending: ScheduledTask::new(),
            last_fired: Arc::new(Mutex::new(None)),
        }
    }

    /// Feed a scroll/resize observation.
    pub fn observe(&mut self, geometry: ScrollGeometry) {
        let visible = geometry.sentinel_in_range(self.margin);
        self.on_visibility_changed(visible);
    }

    /// Raw visibility signal for the sentinel.
    pub fn on_visibility_changed(&mut self, visible: bool) {
        self.visible.store(visible, Ordering::Release);

        if !visible {
            if self.pending.cancel() {
                trace!("sentinel left range, trigger disarmed");
            }
            return;
        }

        // Already armed: the running watcher picks this signal up.
        if self.pending.is_pending() {
            return;
        }

        let target = self.target.clone();
        let visible = self.visible.clone();
        let last_fired = self.last_fired.clone();
        let cooldown = self.cooldown;
        let recheck = cooldown.max(MIN_RECHECK);

        self.pending.schedule(self.delay, async move {
            while visible.load(Ordering::Acquire) {
                if let Some(wait) = cooldown_remaining(&last_fired, cooldown) {
                    tokio::time::sleep(wait).await;
                    continue;
                }
                if target.can_load_more() && target.load_more() {
                    *last_fired.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
                    trace!("infinite scroll loaded a page");
                    continue;
                }
                tokio::time::sleep(recheck).await;
            }
        });
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Whether the trigger is armed (waiting to fire or watching the target).
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn target(&self) -> &L {
        &self.target
    }

    /// Disarm the trigger.
    pub fn teardown(&mut self) {
        self.visible.store(false, Ordering::Release);
        self.pending.cancel();
    }
}

fn cooldown_remaining(last_fired: &Mutex<Option<Instant>>, cooldown: Duration) -> Option<Duration> {
    let at = (*last_fired.lock().unwrap_or_else(PoisonError::into_inner))?;
    cooldown.checked_sub(at.elapsed()).filter(|left| !left.is_zero())
}
