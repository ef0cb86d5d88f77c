//! Authentication: password hashing and the pluggable auth provider.
//!
//! The HTTP layer only ever talks to [`AuthProvider`]; the default
//! [`JwtAuthProvider`] combines JWTs, Argon2id and a [`UserStore`]
//! implemented by the db crate.

mod error;
mod password;
mod provider;
mod types;

pub use error::AuthError;
pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, hash_password, password_fingerprint, validate_password,
    verify_password,
};
pub use provider::{AuthProvider, JwtAuthProvider, UserStore};
pub use types::{IssuedToken, NewUser, User, UserChanges};
