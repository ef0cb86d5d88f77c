//! User domain types.

use glimpse_shared::UserRead;
use uuid::Uuid;

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User ID.
    pub id: Uuid,
    /// Unique email.
    pub email: String,
    /// Argon2id PHC hash.
    pub hashed_password: String,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Whether the account may administer other users.
    pub is_superuser: bool,
    /// Whether the email has been verified.
    pub is_verified: bool,
}

impl From<&User> for UserRead {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Normalized email.
    pub email: String,
    /// Argon2id PHC hash.
    pub hashed_password: String,
    /// Initial active flag.
    pub is_active: bool,
    /// Initial superuser flag.
    pub is_superuser: bool,
    /// Initial verified flag.
    pub is_verified: bool,
}

/// Column changes applied by [`super::UserStore::update`]. `None` leaves the
/// column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// New email.
    pub email: Option<String>,
    /// New password hash.
    pub hashed_password: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New superuser flag.
    pub is_superuser: Option<bool>,
    /// New verified flag.
    pub is_verified: Option<bool>,
}

/// A verification or reset token issued for delivery to the account owner.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Account the token belongs to.
    pub user_id: Uuid,
    /// Address the token should be delivered to.
    pub email: String,
    /// Signed token.
    pub token: String,
}
