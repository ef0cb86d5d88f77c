//! The auth provider seam and its JWT-backed implementation.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use glimpse_shared::{JwtService, TokenPurpose, UserUpdate};
use tracing::{debug, info};
use uuid::Uuid;

use super::error::AuthError;
use super::password::{hash_password, password_fingerprint, validate_password, verify_password};
use super::types::{IssuedToken, NewUser, User, UserChanges};

/// Persistence trait for user accounts.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait UserStore: Send + Sync {
    /// Find a user by ID.
    fn find_by_id(&self, id: Uuid)
    -> impl Future<Output = Result<Option<User>, AuthError>> + Send;

    /// Find a user by normalized email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, AuthError>> + Send;

    /// Insert a new user.
    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, AuthError>> + Send;

    /// Apply column changes to an existing user.
    fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;

    /// Delete a user. Returns false when no row matched.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool, AuthError>> + Send;
}

/// Capability set the HTTP layer needs from an authentication backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account. Privilege flags always start cleared.
    async fn register(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Check credentials and return the account.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Mint a bearer access token for an authenticated account.
    fn issue_token(&self, user: &User) -> Result<String, AuthError>;

    /// Validate a bearer access token and return its subject.
    fn verify_token(&self, token: &str) -> Result<Uuid, AuthError>;

    /// Resolve a bearer token to an active account.
    async fn current_user(&self, token: &str) -> Result<User, AuthError>;

    /// Issue a reset token when the account exists and is active.
    async fn request_reset(&self, email: &str) -> Result<Option<IssuedToken>, AuthError>;

    /// Set a new password using a reset token.
    async fn confirm_reset(&self, token: &str, password: &str) -> Result<User, AuthError>;

    /// Issue a verification token when the account exists, is active and is
    /// not yet verified.
    async fn request_verify(&self, email: &str) -> Result<Option<IssuedToken>, AuthError>;

    /// Mark an account verified using a verification token.
    async fn verify_email(&self, token: &str) -> Result<User, AuthError>;

    /// Fetch an account by ID.
    async fn get_user(&self, id: Uuid) -> Result<User, AuthError>;

    /// Apply a partial update. Callers strip fields the actor may not set.
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, AuthError>;

    /// Delete an account.
    async fn delete_user(&self, id: Uuid) -> Result<(), AuthError>;
}

/// Default provider: HS256 JWTs, Argon2id hashes and a [`UserStore`].
pub struct JwtAuthProvider<S: UserStore> {
    jwt: Arc<JwtService>,
    store: S,
    require_verified: bool,
}

impl<S: UserStore> JwtAuthProvider<S> {
    /// Create a provider over `store`.
    #[must_use]
    pub fn new(jwt: Arc<JwtService>, store: S) -> Self {
        Self {
            jwt,
            store,
            require_verified: false,
        }
    }

    /// Refuse logins from unverified accounts.
    #[must_use]
    pub fn require_verified(mut self, require: bool) -> Self {
        self.require_verified = require;
        self
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_password(password: &str, email: &str, code: &'static str) -> Result<(), AuthError> {
    validate_password(password, email).map_err(|reason| AuthError::InvalidPassword { code, reason })
}

#[async_trait]
impl<S: UserStore> AuthProvider for JwtAuthProvider<S> {
    async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AuthError::InvalidEmail);
        }
        check_password(password, &email, "REGISTER_INVALID_PASSWORD")?;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = self
            .store
            .create(NewUser {
                email,
                hashed_password: hash_password(password)?,
                is_active: true,
                is_superuser: false,
                is_verified: false,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.store.find_by_email(&normalize_email(email)).await? else {
            // Burn a hash so unknown emails cost the same as wrong passwords.
            hash_password(password)?;
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.hashed_password)? || !user.is_active {
            debug!(user_id = %user.id, "Rejected login");
            return Err(AuthError::InvalidCredentials);
        }
        if self.require_verified && !user.is_verified {
            return Err(AuthError::NotVerified);
        }

        Ok(user)
    }

    fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        Ok(self.jwt.generate_access_token(user.id)?)
    }

    fn verify_token(&self, token: &str) -> Result<Uuid, AuthError> {
        self.jwt
            .validate_token(token, TokenPurpose::Access)
            .map(|claims| claims.user_id())
            .map_err(|_| AuthError::InvalidToken)
    }

    async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let user_id = self.verify_token(token)?;

        match self.store.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::InvalidToken),
        }
    }

    async fn request_reset(&self, email: &str) -> Result<Option<IssuedToken>, AuthError> {
        let Some(user) = self.store.find_by_email(&normalize_email(email)).await? else {
            return Ok(None);
        };
        if !user.is_active {
            return Ok(None);
        }

        let token = self
            .jwt
            .generate_reset_token(user.id, &password_fingerprint(&user.hashed_password))?;
        info!(user_id = %user.id, "Password reset requested");

        Ok(Some(IssuedToken {
            user_id: user.id,
            email: user.email,
            token,
        }))
    }

    async fn confirm_reset(&self, token: &str, password: &str) -> Result<User, AuthError> {
        let claims = self
            .jwt
            .validate_token(token, TokenPurpose::ResetPassword)
            .map_err(|_| AuthError::BadResetToken)?;

        let user = self
            .store
            .find_by_id(claims.user_id())
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::BadResetToken)?;

        if claims.password_fgpt.as_deref()
            != Some(password_fingerprint(&user.hashed_password).as_str())
        {
            return Err(AuthError::BadResetToken);
        }

        check_password(password, &user.email, "RESET_PASSWORD_INVALID_PASSWORD")?;

        let user = self
            .store
            .update(
                user.id,
                UserChanges {
                    hashed_password: Some(hash_password(password)?),
                    ..UserChanges::default()
                },
            )
            .await?;

        info!(user_id = %user.id, "Password reset");
        Ok(user)
    }

    async fn request_verify(&self, email: &str) -> Result<Option<IssuedToken>, AuthError> {
        let Some(user) = self.store.find_by_email(&normalize_email(email)).await? else {
            return Ok(None);
        };
        if !user.is_active || user.is_verified {
            return Ok(None);
        }

        let token = self.jwt.generate_verify_token(user.id, &user.email)?;
        Ok(Some(IssuedToken {
            user_id: user.id,
            email: user.email,
            token,
        }))
    }

    async fn verify_email(&self, token: &str) -> Result<User, AuthError> {
        let claims = self
            .jwt
            .validate_token(token, TokenPurpose::Verify)
            .map_err(|_| AuthError::BadVerifyToken)?;
        let email = claims.email.as_deref().ok_or(AuthError::BadVerifyToken)?;

        let user = self
            .store
            .find_by_id(claims.user_id())
            .await?
            .filter(|u| u.email == email)
            .ok_or(AuthError::BadVerifyToken)?;

        if user.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let user = self
            .store
            .update(
                user.id,
                UserChanges {
                    is_verified: Some(true),
                    ..UserChanges::default()
                },
            )
            .await?;

        info!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, AuthError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, AuthError> {
        let user = self.get_user(id).await?;
        let mut changes = UserChanges {
            is_active: update.is_active,
            is_superuser: update.is_superuser,
            is_verified: update.is_verified,
            ..UserChanges::default()
        };

        if let Some(email) = update.email.as_deref().map(normalize_email) {
            if email != user.email {
                if self.store.find_by_email(&email).await?.is_some() {
                    return Err(AuthError::EmailTaken);
                }
                // A new address has to be verified again.
                changes.is_verified = Some(update.is_verified.unwrap_or(false));
                changes.email = Some(email);
            }
        }

        if let Some(password) = update.password.as_deref() {
            let email = changes.email.as_deref().unwrap_or(&user.email);
            check_password(password, email, "UPDATE_USER_INVALID_PASSWORD")?;
            changes.hashed_password = Some(hash_password(password)?);
        }

        if changes == UserChanges::default() {
            return Ok(user);
        }
        self.store.update(id, changes).await
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), AuthError> {
        if self.store.delete(id).await? {
            info!(user_id = %id, "User deleted");
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }
}
