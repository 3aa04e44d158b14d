//! Error types and result handling for capture operations.
//!
//! Defines the small taxonomy the handlers map onto HTTP statuses: missing
//! entities are recoverable, storage failures are not, and a failed body
//! read is a soft signal that never aborts a capture.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for storage and service operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Entity not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Constraint violation, including a generated-identifier collision.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("requested entity not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::ConstraintViolation(format!("unique constraint violation: {}", db_err))
            },
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Self::ConstraintViolation(format!("foreign key constraint violation: {}", db_err))
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

/// The inbound body stream could not be fully read.
///
/// Deliberately not a `CoreError` variant: capture proceeds with an empty
/// body and this travels alongside the captured record as a warning signal.
/// The metadata of the request is still worth keeping when the body is not.
#[derive(Debug, Clone, Error)]
#[error("could not read the request body: {0}")]
pub struct BodyReadError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = CoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn protocol_errors_map_to_database() {
        let err = CoreError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, CoreError::Database(_)));
    }

    #[test]
    fn body_read_error_is_distinct_from_core_errors() {
        let err = BodyReadError("connection reset".to_string());
        assert_eq!(err.to_string(), "could not read the request body: connection reset");
    }
}
