//! # vitrine-store
//!
//! SQLite persistence for the gallery.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for the image catalog
//! (read side, plus the upsert used for seeding) and for storage requests.

pub mod database;
pub mod images;
pub mod migrations;
pub mod models;
pub mod storage_requests;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
