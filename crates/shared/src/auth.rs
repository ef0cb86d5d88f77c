//! Authentication types for tokens and the auth/user endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token may be used for. Encoded as the JWT `aud` claim so a token
/// minted for one flow is rejected by every other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    /// Bearer access token for API calls.
    Access,
    /// Email verification link.
    Verify,
    /// Password reset link.
    ResetPassword,
}

impl TokenPurpose {
    /// Returns the audience string for this purpose.
    #[must_use]
    pub const fn audience(self) -> &'static str {
        match self {
            Self::Access => "glimpse:auth",
            Self::Verify => "glimpse:verify",
            Self::ResetPassword => "glimpse:reset",
        }
    }
}

/// JWT claims shared by every token purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Audience, see [`TokenPurpose::audience`].
    pub aud: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Email the verification token was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Fingerprint of the password hash a reset token was issued against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_fgpt: Option<String>,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, purpose: TokenPurpose, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            aud: purpose.audience().to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            email: None,
            password_fgpt: None,
        }
    }

    /// Attaches the email a verification token is bound to.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attaches the password fingerprint a reset token is bound to.
    #[must_use]
    pub fn with_password_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.password_fgpt = Some(fingerprint.into());
        self
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Login form (`application/x-www-form-urlencoded`, OAuth2 password flow).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    /// User email.
    pub username: String,
    /// User password.
    pub password: String,
}

/// Access token issued after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerToken {
    /// Signed access token.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
}

impl BearerToken {
    /// Wraps an access token.
    #[must_use]
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Registration request payload.
///
/// Privilege flags sent by the client are not part of this type and are
/// dropped during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRead {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Whether the account may administer other users.
    pub is_superuser: bool,
    /// Whether the email address has been verified.
    pub is_verified: bool,
}

/// Partial user update.
///
/// The flag fields are only honoured on the superuser route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    /// New email.
    pub email: Option<String>,
    /// New password.
    pub password: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New superuser flag.
    pub is_superuser: Option<bool>,
    /// New verified flag.
    pub is_verified: Option<bool>,
}

impl UserUpdate {
    /// Drops every field a user may not change on their own account.
    #[must_use]
    pub fn self_service(self) -> Self {
        Self {
            email: self.email,
            password: self.password,
            ..Self::default()
        }
    }
}

/// Forgot password request.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    /// Account email.
    pub email: String,
}

/// Password reset confirmation.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    /// Token from the reset email.
    pub token: String,
    /// New password.
    pub password: String,
}

/// Request a fresh verification token.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestVerifyRequest {
    /// Account email.
    pub email: String,
}

/// Email verification request.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    /// The verification token from the email link.
    pub token: String,
}
