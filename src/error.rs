//! Error types for the artifact cache
//!
//! Provides unified error handling using thiserror. Cache operations never
//! surface these to callers; they are logged at the boundary and turned into
//! a miss or a `false`. The HTTP layer maps them onto status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache and its collaborators.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not present in either tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid key, payload or request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or mismatched API token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Durable tier file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Durable tier entry header could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Document source fetch failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A collaborator (durable tier, document source) is not available
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Upstream(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CacheError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CacheError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Io(_) | CacheError::Serialization(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the artifact cache.
pub type Result<T> = std::result::Result<T, CacheError>;
