//! # vitrine-shared
//!
//! Types and rules shared by the gallery server, the store and the client:
//! the image record served over `/api/images`, the storage-request form and
//! its validation, and the tuning constants the front end relies on.

pub mod constants;
pub mod error;
pub mod request;
pub mod types;

pub use error::ValidationError;
pub use request::{NewStorageRequest, ValidStorageRequest};
pub use types::{ApiResponse, ImageId, ImageRecord, RequestStatus, StorageRequest};
