//! Core business logic for Glimpse.
//!
//! This crate contains business logic with no web framework or database
//! dependencies. Persistence is reached through traits the db crate
//! implements.
//!
//! # Modules
//!
//! - `auth` - Password hashing and the pluggable auth provider
//! - `storage` - Media CDN / object storage collaborator
//! - `post` - Upload, feed and delete orchestration

pub mod auth;
pub mod post;
pub mod storage;
