//! Lightbox viewer state.
//!
//! The viewer is opened on a snapshot of the list the user was looking at
//! (the filtered view, or the full catalog for a deep link) and navigates
//! within it without wrapping. Each time the shown image changes it is
//! published as the "last viewed" pointer so the grid can scroll back to it.

use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use vitrine_shared::ImageRecord;

use crate::error::{ClientError, Result};
use crate::last_viewed::{LastViewed, LastViewedWriter};

/// Which way the last navigation went. Only drives the slide animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Still,
}

impl Direction {
    pub fn between(old: usize, new: usize) -> Self {
        match new.cmp(&old) {
            std::cmp::Ordering::Greater => Self::Forward,
            std::cmp::Ordering::Less => Self::Backward,
            std::cmp::Ordering::Equal => Self::Still,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Other,
}

/// Horizontal swipe, named by the way the finger moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Moved(usize),
    Unchanged,
    Closed,
}

pub struct Viewer {
    images: Arc<Vec<ImageRecord>>,
    index: Option<usize>,
    direction: Direction,
    last_viewed: LastViewedWriter,
}

impl Viewer {
    pub fn new(last_viewed: LastViewedWriter) -> Self {
        Self {
            images: Arc::new(Vec::new()),
            index: None,
            direction: Direction::Still,
            last_viewed,
        }
    }

    pub fn open(&mut self, images: Arc<Vec<ImageRecord>>, index: usize) -> Result<&ImageRecord> {
        if index >= images.len() {
            return Err(ClientError::IndexOutOfBounds {
                index,
                len: images.len(),
            });
        }

        self.images = images;
        self.index = Some(index);
        self.direction = Direction::Still;
        self.publish(index);

        debug!(index, id = %self.images[index].id, "viewer opened");
        Ok(&self.images[index])
    }

    /// Close the viewer. Returns the index that was shown, if any.
    pub fn close(&mut self) -> Option<usize> {
        let closed = self.index.take();
        self.direction = Direction::Still;
        if let Some(index) = closed {
            debug!(index, "viewer closed");
        }
        closed
    }

    /// Move one image forward. No-op on the last image.
    pub fn next(&mut self) -> bool {
        match self.index {
            Some(i) if i + 1 < self.images.len() => self.move_to(i + 1),
            _ => false,
        }
    }

    /// Move one image back. No-op on the first image.
    pub fn prev(&mut self) -> bool {
        match self.index {
            Some(i) if i > 0 => self.move_to(i - 1),
            _ => false,
        }
    }

    /// Jump to `index` (thumbnail click, swipe settling on a slide).
    pub fn go_to(&mut self, index: usize) -> Result<bool> {
        if self.index.is_none() {
            return Ok(false);
        }
        if index >= self.images.len() {
            return Err(ClientError::IndexOutOfBounds {
                index,
                len: self.images.len(),
            });
        }
        Ok(self.move_to(index))
    }

    pub fn handle_key(&mut self, key: Key) -> ViewerAction {
        if !self.is_open() {
            return ViewerAction::Unchanged;
        }
        match key {
            Key::ArrowRight => self.action_after(Self::next),
            Key::ArrowLeft => self.action_after(Self::prev),
            Key::Escape => {
                self.close();
                ViewerAction::Closed
            }
            Key::Other => ViewerAction::Unchanged,
        }
    }

    pub fn handle_swipe(&mut self, swipe: Swipe) -> ViewerAction {
        match swipe {
            Swipe::Left => self.action_after(Self::next),
            Swipe::Right => self.action_after(Self::prev),
        }
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.index.and_then(|i| self.images.get(i))
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_open(&self) -> bool {
        self.index.is_some()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn images(&self) -> &Arc<Vec<ImageRecord>> {
        &self.images
    }

    /// Thumbnail indices to show in a strip of `strip_len`, keeping the
    /// active image as close to the centre as the list bounds allow.
    pub fn thumbnail_window(&self, strip_len: usize) -> Range<usize> {
        let len = self.images.len();
        let Some(active) = self.index else {
            return 0..0;
        };
        let start = active
            .saturating_sub(strip_len / 2)
            .min(len.saturating_sub(strip_len));
        start..(start + strip_len).min(len)
    }

    fn action_after(&mut self, step: fn(&mut Self) -> bool) -> ViewerAction {
        if step(self) {
            self.index.map_or(ViewerAction::Unchanged, ViewerAction::Moved)
        } else {
            ViewerAction::Unchanged
        }
    }

    fn move_to(&mut self, new: usize) -> bool {
        let Some(old) = self.index else {
            return false;
        };
        if new == old {
            return false;
        }
        self.direction = Direction::between(old, new);
        self.index = Some(new);
        self.publish(new);
        true
    }

    fn publish(&self, index: usize) {
        self.last_viewed.publish(LastViewed {
            image_id: self.images[index].id.clone(),
            index,
        });
    }
}
