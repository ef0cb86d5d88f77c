//! Media storage collaborator.
//!
//! Uploads are forwarded to one configured backend:
//! - ImageKit, over its HTTP upload API
//! - Local filesystem through Apache OpenDAL (development only)
//!
//! ```text
//! PostService ──▶ StorageService (timeout) ──▶ dyn MediaStorage
//!                                               ├─ ImageKitStorage
//!                                               └─ LocalFsStorage
//! ```

mod config;
mod error;
mod imagekit;
mod local;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use imagekit::ImageKitStorage;
pub use local::LocalFsStorage;
#[cfg(test)]
pub use service::MockMediaStorage;
pub use service::{MediaStorage, MediaUpload, StorageService, StoredMedia, UploadOptions};
