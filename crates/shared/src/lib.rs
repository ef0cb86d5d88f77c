//! Shared types, errors, and configuration for Glimpse.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT signing and validation
//! - Auth request/response types
//! - Account email delivery
//! - Pagination types for list endpoints

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, TokenPurpose, UserRead, UserUpdate};
pub use config::{AppConfig, EmailConfig, StorageSettings};
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
