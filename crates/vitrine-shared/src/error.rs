use thiserror::Error;

/// Why a storage-request form was rejected before reaching the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,
}
