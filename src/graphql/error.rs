//! GraphQL transport and decoding errors

use thiserror::Error;

/// Errors that can occur while talking to the GraphQL endpoint
#[derive(Error, Debug)]
pub enum SyncError {
    /// Endpoint could not be reached
    #[error("GraphQL endpoint unavailable")]
    Unavailable,

    /// Request did not complete in time
    #[error("Request timeout")]
    Timeout,

    /// Any other transport failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Endpoint answered with GraphQL errors
    #[error("GraphQL errors: {}", .0.join("; "))]
    Graphql(Vec<String>),

    /// Response was not in the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SyncError {
    /// Whether the failure happened before a response was received
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SyncError::Unavailable | SyncError::Timeout | SyncError::Transport(_)
        )
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Timeout
        } else if err.is_connect() {
            SyncError::Unavailable
        } else if err.is_decode() {
            SyncError::Parse(err.to_string())
        } else {
            SyncError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Parse(err.to_string())
    }
}

/// Result type alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
