//! JWT token generation and validation.
//!
//! Access, verification and reset tokens are all HS256 JWTs signed with the
//! same secret; the `aud` claim keeps them apart.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{Claims, TokenPurpose};
use crate::config::JwtSettings;

/// Longest lifetime any token may be issued with (ten years).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_lifetime_secs: i64,
    /// Verification token lifetime in seconds.
    pub verify_token_lifetime_secs: i64,
    /// Reset token lifetime in seconds.
    pub reset_token_lifetime_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_lifetime_secs: 3600,
            verify_token_lifetime_secs: 3600,
            reset_token_lifetime_secs: 3600,
        }
    }
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        let secs = |v: u64| i64::try_from(v).map_or(MAX_TOKEN_LIFETIME_SECS, clamp_lifetime);
        Self {
            secret: settings.secret.clone(),
            access_token_lifetime_secs: secs(settings.access_token_lifetime_secs),
            verify_token_lifetime_secs: secs(settings.verify_token_lifetime_secs),
            reset_token_lifetime_secs: secs(settings.reset_token_lifetime_secs),
        }
    }
}

fn clamp_lifetime(secs: i64) -> i64 {
    secs.clamp(0, MAX_TOKEN_LIFETIME_SECS)
}

fn expires_after(secs: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(clamp_lifetime(secs))
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token was minted for a different purpose.
    #[error("token audience mismatch")]
    WrongPurpose,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_lifetime_secs", &self.config.access_token_lifetime_secs)
            .field("secret", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Signs arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if signing fails.
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Generates an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, JwtError> {
        let expires_at = expires_after(self.config.access_token_lifetime_secs);
        self.sign(&Claims::new(user_id, TokenPurpose::Access, expires_at))
    }

    /// Generates an email verification token bound to `email`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_verify_token(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        let expires_at = expires_after(self.config.verify_token_lifetime_secs);
        self.sign(&Claims::new(user_id, TokenPurpose::Verify, expires_at).with_email(email))
    }

    /// Generates a password reset token bound to a password fingerprint.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_reset_token(
        &self,
        user_id: Uuid,
        password_fingerprint: &str,
    ) -> Result<String, JwtError> {
        let expires_at = expires_after(self.config.reset_token_lifetime_secs);
        self.sign(
            &Claims::new(user_id, TokenPurpose::ResetPassword, expires_at)
                .with_password_fingerprint(password_fingerprint),
        )
    }

    /// Validates and decodes a token minted for `purpose`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired,
    /// `JwtError::WrongPurpose` if the audience does not match and
    /// `JwtError::DecodingError` for anything else.
    pub fn validate_token(&self, token: &str, purpose: TokenPurpose) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[purpose.audience()]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidAudience => JwtError::WrongPurpose,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            ..JwtConfig::default()
        })
    }

    #[test]
    fn test_access_token_roundtrip() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.generate_access_token(user_id).unwrap();
        let claims = service.validate_token(&token, TokenPurpose::Access).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_token_carries_email() {
        let service = create_test_service();
        let token = service
            .generate_verify_token(Uuid::new_v4(), "a@example.com")
            .unwrap();
        let claims = service.validate_token(&token, TokenPurpose::Verify).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_purpose_is_enforced() {
        let service = create_test_service();
        let token = service
            .generate_reset_token(Uuid::new_v4(), "fingerprint")
            .unwrap();

        let result = service.validate_token(&token, TokenPurpose::Access);
        assert!(matches!(result, Err(JwtError::WrongPurpose)));
    }

    #[test]
    fn test_expired_token() {
        let service = create_test_service();
        let claims = Claims::new(
            Uuid::new_v4(),
            TokenPurpose::Access,
            Utc::now() - Duration::hours(2),
        );
        let token = service.sign(&claims).unwrap();

        let result = service.validate_token(&token, TokenPurpose::Access);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = JwtService::new(JwtConfig {
            secret: "someone-else".to_string(),
            ..JwtConfig::default()
        })
        .generate_access_token(Uuid::new_v4())
        .unwrap();

        let result = create_test_service().validate_token(&token, TokenPurpose::Access);
        assert!(matches!(result, Err(JwtError::DecodingError(_))));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        let result = service.validate_token("invalid.token.here", TokenPurpose::Access);
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_lifetime_is_clamped() {
        let settings = JwtSettings {
            secret: "s3cret".to_string(),
            access_token_lifetime_secs: u64::MAX,
            verify_token_lifetime_secs: 60,
            reset_token_lifetime_secs: u64::MAX / 2,
        };
        let config = JwtConfig::from(&settings);
        assert_eq!(config.access_token_lifetime_secs, MAX_TOKEN_LIFETIME_SECS);
        assert_eq!(config.verify_token_lifetime_secs, 60);
        assert_eq!(config.reset_token_lifetime_secs, MAX_TOKEN_LIFETIME_SECS);

        let service = JwtService::new(config);
        let token = service.generate_access_token(Uuid::new_v4()).unwrap();
        let claims = service.validate_token(&token, TokenPurpose::Access).unwrap();
        let lifetime = claims.exp - claims.iat;
        assert!((MAX_TOKEN_LIFETIME_SECS - 1..=MAX_TOKEN_LIFETIME_SECS).contains(&lifetime));
    }

    #[test]
    fn test_direct_config_lifetime_is_clamped() {
        let service = JwtService::new(JwtConfig {
            secret: "s3cret".to_string(),
            access_token_lifetime_secs: i64::MAX,
            ..JwtConfig::default()
        });
        assert!(service.generate_access_token(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", create_test_service());
        assert!(!rendered.contains("test-secret-key-for-testing"));
    }
}
