//! Local filesystem backend through OpenDAL (development only).

use std::path::Path;

use async_trait::async_trait;
use opendal::{Operator, services};
use tracing::debug;
use uuid::Uuid;

use super::error::StorageError;
use super::service::{MediaStorage, MediaUpload, StoredMedia, sanitize_filename};

/// Writes uploads under a root directory and serves them from a base URL.
#[derive(Debug, Clone)]
pub struct LocalFsStorage {
    operator: Operator,
    public_base_url: String,
}

impl LocalFsStorage {
    /// Create a backend rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created, is not UTF-8, or the
    /// operator cannot be built.
    pub fn new(root: &Path, public_base_url: impl Into<String>) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root)?;
        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| StorageError::configuration("invalid path"))?,
        );

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self {
            operator,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Public URL for a stored name.
    #[must_use]
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.public_base_url, name)
    }
}

/// `<stem>_<random>.<ext>`, or the sanitized name as-is.
fn stored_name(file_name: &str, unique: bool) -> String {
    let sanitized = sanitize_filename(file_name);
    if !unique {
        return sanitized;
    }

    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..10];
    match Path::new(&sanitized)
        .file_stem()
        .and_then(|s| s.to_str())
        .zip(Path::new(&sanitized).extension().and_then(|e| e.to_str()))
    {
        Some((stem, ext)) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{sanitized}_{suffix}"),
    }
}

#[async_trait]
impl MediaStorage for LocalFsStorage {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, StorageError> {
        let data = tokio::fs::read(&upload.path).await?;
        let name = stored_name(&upload.file_name, upload.options.use_unique_file_name);

        self.operator.write(&name, data).await?;
        debug!(%name, "Stored media on local filesystem");

        Ok(StoredMedia {
            file_id: None,
            url: self.url_for(&name),
            name,
            status: 200,
        })
    }
}
