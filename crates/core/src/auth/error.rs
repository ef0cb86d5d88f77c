//! Authentication error types.

use glimpse_shared::{AppError, JwtError};
use thiserror::Error;

use super::password::PasswordError;

/// Authentication and user management errors.
///
/// The `Display` text of the client-facing variants is a stable code the
/// frontend switches on.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password or inactive account.
    #[error("LOGIN_BAD_CREDENTIALS")]
    InvalidCredentials,

    /// Login refused until the email is verified.
    #[error("LOGIN_USER_NOT_VERIFIED")]
    NotVerified,

    /// Email is already registered.
    #[error("REGISTER_USER_ALREADY_EXISTS")]
    UserAlreadyExists,

    /// Email is not a plausible address.
    #[error("INVALID_EMAIL")]
    InvalidEmail,

    /// Password rejected by the policy.
    #[error("{code}: {reason}")]
    InvalidPassword {
        /// Flow-specific code.
        code: &'static str,
        /// Why the password was rejected.
        reason: String,
    },

    /// Bearer token missing, malformed, expired, or for an unusable account.
    #[error("invalid or expired access token")]
    InvalidToken,

    /// Reset token unusable.
    #[error("RESET_PASSWORD_BAD_TOKEN")]
    BadResetToken,

    /// Verification token unusable.
    #[error("VERIFY_USER_BAD_TOKEN")]
    BadVerifyToken,

    /// Account already verified.
    #[error("VERIFY_USER_ALREADY_VERIFIED")]
    AlreadyVerified,

    /// New email belongs to another account.
    #[error("UPDATE_USER_EMAIL_ALREADY_EXISTS")]
    EmailTaken,

    /// No such user.
    #[error("USER_NOT_FOUND")]
    UserNotFound,

    /// Token signing failed.
    #[error("token error: {0}")]
    Token(#[from] JwtError),

    /// Hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// User store failed.
    #[error("user store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Create a store error.
    #[must_use]
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => Self::Unauthorized(err.to_string()),
            AuthError::UserNotFound => Self::NotFound(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::NotVerified
            | AuthError::UserAlreadyExists
            | AuthError::InvalidEmail
            | AuthError::InvalidPassword { .. }
            | AuthError::BadResetToken
            | AuthError::BadVerifyToken
            | AuthError::AlreadyVerified
            | AuthError::EmailTaken => Self::Validation(err.to_string()),
            AuthError::Store(msg) => Self::Database(msg),
            AuthError::Token(_) | AuthError::Password(_) => Self::Internal(err.to_string()),
        }
    }
}
