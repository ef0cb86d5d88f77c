//! Post error types.

use glimpse_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;

/// Post operation errors.
#[derive(Debug, Error)]
pub enum PostError {
    /// Post not found.
    #[error("Post not found")]
    NotFound,

    /// Caller does not own the post.
    #[error("You don't have access to delete this post")]
    Forbidden,

    /// Post ID is not a UUID.
    #[error("Invalid post id: {0}")]
    InvalidId(String),

    /// Staging the upload on local disk failed.
    #[error("failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),

    /// Storage operation failed.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Storage answered with a status other than 200.
    #[error("storage upload failed with status {status}")]
    UploadRejected {
        /// Status reported by the provider.
        status: u16,
    },

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl PostError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound => Self::NotFound(err.to_string()),
            PostError::Forbidden => Self::Forbidden(err.to_string()),
            PostError::InvalidId(_) => Self::Validation(err.to_string()),
            PostError::Storage(StorageError::Timeout { .. }) => Self::Timeout(err.to_string()),
            PostError::Storage(_) | PostError::UploadRejected { .. } => {
                Self::ExternalService(err.to_string())
            }
            PostError::Staging(_) => Self::Internal(err.to_string()),
            PostError::Repository(msg) => Self::Database(msg),
        }
    }
}
