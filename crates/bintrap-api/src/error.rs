//! HTTP-boundary error mapping.
//!
//! Core errors propagate up to here unmodified and are recovered into
//! status codes plus a top-level `errors` document. A failure in one
//! request never affects others; nothing in this module panics.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bintrap_core::CoreError;
use thiserror::Error;

use crate::render::error_document;

/// Result alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors a handler can surface to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Referenced bin or request does not exist. Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// Persistence or other unclassified failure. Maps to 500.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(detail) => Self::NotFound(detail),
            CoreError::Database(detail) | CoreError::ConstraintViolation(detail) => {
                Self::Internal(detail)
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = error_document(status.as_u16(), self.to_string());

        (status, Json(body)).into_response()
    }
}
