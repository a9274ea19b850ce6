//! Row types persisted in the gallery database.
//!
//! The read models (`ImageRecord`, `StorageRequest`) are shared with the
//! server and client and live in `vitrine-shared`; this module adds the
//! write-side shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use vitrine_shared::types::{ImageId, ImageRecord, RequestStatus, StorageRequest};

// ---------------------------------------------------------------------------
// Image (write side)
// ---------------------------------------------------------------------------

/// An image as provided by the catalog owner (seed files, imports).
///
/// Timestamps are optional in seed files; missing ones are filled with the
/// time of the upsert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewImage {
    pub id: ImageId,
    pub code: String,
    pub number: i64,
    pub url: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
