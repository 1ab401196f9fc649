//! Error types and result handling for storage operations.
//!
//! Storage failures surface as a small taxonomy so the request boundary
//! can log and map them to coarse HTTP statuses without inspecting
//! driver-specific error values.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for storage operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Entity not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Constraint violation.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("requested entity not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::ConstraintViolation(format!("unique constraint violation: {db_err}"))
            },
            _ => Self::Database(err.to_string()),
        }
    }
}
