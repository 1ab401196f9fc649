//! Error types for upstream snapshot fetches.

use thiserror::Error;

/// Result type alias using [`UpstreamError`].
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Errors raised while fetching a room snapshot.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The HTTP client could not be constructed.
    #[error("upstream client configuration error: {0}")]
    Configuration(String),

    /// The request exceeded the configured timeout.
    #[error("upstream request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout in whole seconds.
        timeout_secs: u64,
    },

    /// The request failed before an HTTP response was received.
    #[error("upstream network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("upstream responded with status {status}")]
    Status {
        /// HTTP status code of the response.
        status: u16,
    },
}

impl UpstreamError {
    /// True when the error is a non-success HTTP response rather than a
    /// transport failure.
    pub const fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}
