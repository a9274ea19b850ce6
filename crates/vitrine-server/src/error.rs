use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use vitrine_shared::{ApiResponse, ImageId, ValidationError};
use vitrine_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Image not found: {0}")]
    ImageNotFound(ImageId),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Too many requests")]
    RateLimited,

    #[error("A request for this image was already received")]
    DuplicateRequest,

    #[error("Store query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::ImageNotFound(_) => (StatusCode::NOT_FOUND, "Image not found".to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ServerError::DuplicateRequest => (StatusCode::CONFLICT, self.to_string()),
            ServerError::Timeout(_) | ServerError::Store(_) | ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, axum::Json(ApiResponse::<()>::failed(message))).into_response()
    }
}
