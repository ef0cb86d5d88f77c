//! Storage service and the backend trait.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::imagekit::ImageKitStorage;
use super::local::LocalFsStorage;

/// Tag attached to every upload coming through the backend.
pub const BACKEND_UPLOAD_TAG: &str = "backend-upload";

/// Provider options sent alongside a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Ask the provider to append a random suffix to the name.
    pub use_unique_file_name: bool,
    /// Provider-side tags.
    pub tags: Vec<String>,
}

impl UploadOptions {
    /// Options used for feed uploads.
    #[must_use]
    pub fn backend_default() -> Self {
        Self {
            use_unique_file_name: true,
            tags: vec![BACKEND_UPLOAD_TAG.to_string()],
        }
    }
}

/// A staged file ready to be forwarded.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Path of the staged file.
    pub path: PathBuf,
    /// Original client file name.
    pub file_name: String,
    /// Provider options.
    pub options: UploadOptions,
}

/// What the provider reported after storing a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Provider file ID, when the provider has one.
    pub file_id: Option<String>,
    /// Final stored name.
    pub name: String,
    /// Durable public URL.
    pub url: String,
    /// HTTP status the provider answered with.
    pub status: u16,
}

/// A media storage backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store the staged file and report where it lives.
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, StorageError>;
}

/// Storage service for feed media.
pub struct StorageService {
    backend: Arc<dyn MediaStorage>,
    provider: &'static str,
    timeout: Duration,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("provider", &self.provider)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let provider = config.provider.name();
        let backend: Arc<dyn MediaStorage> = match config.provider {
            StorageProvider::ImageKit {
                private_key,
                upload_endpoint,
            } => Arc::new(ImageKitStorage::new(upload_endpoint, private_key)?),
            StorageProvider::LocalFs {
                root,
                public_base_url,
            } => Arc::new(LocalFsStorage::new(&root, public_base_url)?),
        };

        Ok(Self {
            backend,
            provider,
            timeout: config.upload_timeout,
        })
    }

    /// Wrap an already-built backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn MediaStorage>, timeout: Duration) -> Self {
        Self {
            backend,
            provider: "custom",
            timeout,
        }
    }

    /// Forward a staged file to the backend, bounded by the upload timeout.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or [`StorageError::Timeout`] when the
    /// backend does not answer in time.
    pub async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, StorageError> {
        debug!(provider = self.provider, file_name = %upload.file_name, "Uploading media");

        match tokio::time::timeout(self.timeout, self.backend.upload(upload)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(provider = self.provider, timeout = ?self.timeout, "Media upload timed out");
                Err(StorageError::Timeout {
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
pub(super) fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
