//! Storage configuration types.

use std::path::PathBuf;
use std::time::Duration;

use glimpse_shared::StorageSettings;
use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// ImageKit media CDN.
    #[serde(rename = "imagekit")]
    ImageKit {
        /// Private API key, used as the basic-auth username.
        private_key: String,
        /// Upload API endpoint.
        upload_endpoint: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
        /// Base URL the root directory is served under.
        public_base_url: String,
    },
}

impl StorageProvider {
    /// Create an ImageKit provider against the public upload endpoint.
    #[must_use]
    pub fn imagekit(private_key: impl Into<String>) -> Self {
        Self::ImageKit {
            private_key: private_key.into(),
            upload_endpoint: StorageSettings::default().upload_endpoint,
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self::LocalFs {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageKit { .. } => "imagekit",
            Self::LocalFs { .. } => "local_fs",
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Upper bound for a single upload.
    pub upload_timeout: Duration,
}

impl StorageConfig {
    /// Default upload timeout: 30 seconds.
    pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            upload_timeout: Self::DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Set the upload timeout.
    #[must_use]
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Build from the `storage` config section.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown provider, or for ImageKit
    /// without a private key.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let provider = match settings.provider.as_str() {
            "imagekit" => {
                if settings.private_key.is_empty() {
                    return Err(StorageError::configuration(
                        "imagekit requires a private key (IMAGE_KIT_PRIVATE)",
                    ));
                }
                StorageProvider::ImageKit {
                    private_key: settings.private_key.clone(),
                    upload_endpoint: settings.upload_endpoint.clone(),
                }
            }
            "local_fs" => {
                StorageProvider::local_fs(&settings.local_root, &settings.public_base_url)
            }
            other => {
                return Err(StorageError::configuration(format!(
                    "unknown storage provider '{other}'"
                )));
            }
        };

        Ok(Self::new(provider).with_upload_timeout(Duration::from_secs(settings.upload_timeout_secs)))
    }
}
