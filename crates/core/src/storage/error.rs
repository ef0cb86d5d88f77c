//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Reading the staged file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request to the provider failed.
    #[error("storage request failed: {0}")]
    Request(String),

    /// The provider answered with an error status.
    #[error("storage upload failed with status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider message, if any.
        message: String,
    },

    /// The provider response could not be understood.
    #[error("invalid storage response: {0}")]
    InvalidResponse(String),

    /// The upload did not finish in time.
    #[error("storage upload timed out after {secs}s")]
    Timeout {
        /// Configured timeout in seconds.
        secs: u64,
    },

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
