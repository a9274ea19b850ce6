use thiserror::Error;

use vitrine_shared::ValidationError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid form: {0}")]
    Validation(#[from] ValidationError),

    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("Index {index} out of bounds for {len} images")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Image has no asset URL")]
    MissingAsset,
}

pub type Result<T> = std::result::Result<T, ClientError>;
