//! ImageKit upload API backend.

use async_trait::async_trait;
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::StorageError;
use super::service::{MediaStorage, MediaUpload, StoredMedia};

/// Uploads files to ImageKit with the private API key.
#[derive(Debug, Clone)]
pub struct ImageKitStorage {
    client: reqwest::Client,
    endpoint: String,
    private_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_id: Option<String>,
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

impl ImageKitStorage {
    /// Create a backend posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("glimpse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorageError::configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            private_key: private_key.into(),
        })
    }

    /// Multipart form whose `file` part streams from the staged file.
    async fn form(upload: &MediaUpload) -> Result<(Form, u64), StorageError> {
        let file = tokio::fs::File::open(&upload.path).await?;
        let size = file.metadata().await?.len();
        let part = Part::stream_with_length(Body::from(file), size)
            .file_name(upload.file_name.clone());

        let form = Form::new()
            .part("file", part)
            .text("fileName", upload.file_name.clone())
            .text(
                "useUniqueFileName",
                upload.options.use_unique_file_name.to_string(),
            )
            .text("tags", upload.options.tags.join(","));
        Ok((form, size))
    }
}

#[async_trait]
impl MediaStorage for ImageKitStorage {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, StorageError> {
        let (form, size) = Self::form(&upload).await?;
        debug!(file_name = %upload.file_name, size, "Posting to ImageKit");

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.message)
                .unwrap_or_default();
            warn!(status = status.as_u16(), %message, "ImageKit rejected upload");
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        Ok(StoredMedia {
            file_id: body.file_id,
            name: body.name,
            url: body.url,
            status: status.as_u16(),
        })
    }
}
