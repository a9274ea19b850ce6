//! Scroll restoration when the grid comes back from the viewer.

use std::time::Duration;

use tracing::debug;

use crate::config::GalleryConfig;
use crate::feed::FeedController;
use crate::last_viewed::{LastViewed, LastViewedReader};
use crate::search::SearchIndex;
use crate::timer::ScheduledTask;

pub struct ScrollRestorer {
    delay: Duration,
    pending: ScheduledTask,
}

impl ScrollRestorer {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            delay: config.restore_delay,
            pending: ScheduledTask::new(),
        }
    }

    /// Drain the last-viewed pointer and, if the image is part of the feed's
    /// current view, make sure the grid displays it and call `on_scroll`
    /// with its grid position after the restore delay.
    ///
    /// The pointer is consumed even when the image is no longer in the view.
    pub fn restore<I, F>(
        &mut self,
        reader: &LastViewedReader,
        feed: &FeedController<I>,
        on_scroll: F,
    ) -> Option<LastViewed>
    where
        I: SearchIndex,
        F: FnOnce(LastViewed) + Send + 'static,
    {
        let viewed = reader.take()?;

        let Some(position) = feed
            .filtered()
            .iter()
            .position(|image| image.id == viewed.image_id)
        else {
            debug!(id = %viewed.image_id, "last viewed image not in the current view");
            return None;
        };

        feed.ensure_visible(position);

        let target = LastViewed {
            image_id: viewed.image_id,
            index: position,
        };
        let scroll_to = target.clone();
        self.pending.schedule(self.delay, async move {
            debug!(index = scroll_to.index, "restoring scroll position");
            on_scroll(scroll_to);
        });
        Some(target)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn teardown(&mut self) {
        self.pending.cancel();
    }
}
