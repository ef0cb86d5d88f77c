//! Request-scoped staging of upload payloads on local disk.

use std::ffi::OsStr;
use std::path::Path;

use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::error::PostError;

/// An upload payload written chunk by chunk to a temporary file.
///
/// The file keeps the client's extension and is deleted when this value is
/// dropped.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    writer: File,
    size: u64,
}

impl StagedFile {
    /// Create an empty staging file for `file_name`.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Staging` if the temporary file cannot be created.
    pub fn create(file_name: &str) -> Result<Self, PostError> {
        let suffix = Path::new(file_name)
            .extension()
            .and_then(OsStr::to_str)
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix("glimpse-upload-")
            .suffix(&suffix)
            .tempfile()
            .map_err(PostError::Staging)?;
        let writer = File::from_std(temp.reopen().map_err(PostError::Staging)?);

        Ok(Self {
            temp,
            writer,
            size: 0,
        })
    }

    /// Append a chunk.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Staging` if the write fails.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), PostError> {
        self.writer
            .write_all(chunk)
            .await
            .map_err(PostError::Staging)?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    /// Flush buffered writes so other readers see the whole payload.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Staging` if the flush fails.
    pub async fn flush(&mut self) -> Result<(), PostError> {
        self.writer.flush().await.map_err(PostError::Staging)
    }

    /// Location of the staging file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Bytes written so far.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }
}
