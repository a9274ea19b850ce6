//! The "last viewed" pointer shared by the viewer and the grid.
//!
//! The viewer publishes which image it shows; when the grid comes back it
//! takes the pointer once to scroll that image into view, which clears it so
//! later re-renders don't scroll again. [`slot`] hands out exactly one writer
//! and one reader; neither half can be cloned.

use std::sync::{Arc, Mutex, PoisonError};

use vitrine_shared::ImageId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastViewed {
    pub image_id: ImageId,
    /// Position in the list the viewer was opened on.
    pub index: usize,
}

type Cell = Arc<Mutex<Option<LastViewed>>>;

#[derive(Debug)]
pub struct LastViewedWriter {
    cell: Cell,
}

#[derive(Debug)]
pub struct LastViewedReader {
    cell: Cell,
}

/// Create a connected writer/reader pair over an empty slot.
pub fn slot() -> (LastViewedWriter, LastViewedReader) {
    let cell: Cell = Arc::new(Mutex::new(None));
    (
        LastViewedWriter { cell: cell.clone() },
        LastViewedReader { cell },
    )
}

impl LastViewedWriter {
    /// Overwrite the pointer.
    pub fn publish(&self, viewed: LastViewed) {
        *self.cell.lock().unwrap_or_else(PoisonError::into_inner) = Some(viewed);
    }
}

impl LastViewedReader {
    /// Read and clear.
    pub fn take(&self) -> Option<LastViewed> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn peek(&self) -> Option<LastViewed> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_once() {
        let (writer, reader) = slot();
        assert_eq!(reader.take(), None);

        writer.publish(LastViewed {
            image_id: ImageId::from("a"),
            index: 3,
        });
        writer.publish(LastViewed {
            image_id: ImageId::from("b"),
            index: 4,
        });

        assert_eq!(reader.peek().map(|v| v.index), Some(4));
        let taken = reader.take().unwrap();
        assert_eq!(taken.image_id, ImageId::from("b"));
        assert_eq!(reader.take(), None);
    }
}
