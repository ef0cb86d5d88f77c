//! Post service implementation.

use std::collections::HashMap;
use std::sync::Arc;

use glimpse_shared::types::{PageMeta, PageRequest};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::PostError;
use super::types::{DeleteAck, Feed, FeedItem, FileType, NewPost, Post, UploadInput};
use crate::storage::{MediaUpload, StorageService, UploadOptions};

/// Repository trait for post persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait PostRepository: Send + Sync {
    /// Insert a post. The repository assigns `id` and `created_at`.
    fn create(
        &self,
        input: NewPost,
    ) -> impl std::future::Future<Output = Result<Post, PostError>> + Send;

    /// Find post by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Post>, PostError>> + Send;

    /// List posts newest first, optionally one page of them.
    fn list_newest_first(
        &self,
        page: Option<PageRequest>,
    ) -> impl std::future::Future<Output = Result<Vec<Post>, PostError>> + Send;

    /// Count all posts.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, PostError>> + Send;

    /// Delete post by ID.
    fn delete(&self, id: Uuid) -> impl std::future::Future<Output = Result<bool, PostError>> + Send;

    /// Map user IDs to emails. Unknown IDs are left out.
    fn author_emails(
        &self,
        user_ids: &[Uuid],
    ) -> impl std::future::Future<Output = Result<HashMap<Uuid, String>, PostError>> + Send;
}

/// Post service for the feed.
pub struct PostService<R: PostRepository> {
    storage: Arc<StorageService>,
    repo: Arc<R>,
}

impl<R: PostRepository> PostService<R> {
    /// Create a new post service.
    #[must_use]
    pub fn new(storage: Arc<StorageService>, repo: Arc<R>) -> Self {
        Self { storage, repo }
    }

    /// Store an upload and record the post.
    ///
    /// The staging file is removed when this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The staging file cannot be flushed
    /// - The storage provider fails, times out, or answers with a non-200 status
    /// - Database operation fails
    pub async fn upload(&self, input: UploadInput) -> Result<Post, PostError> {
        let UploadInput {
            user_id,
            file_name,
            content_type,
            caption,
            mut staged,
        } = input;

        staged.flush().await?;
        debug!(path = %staged.path().display(), size = staged.size(), "Staged upload");

        let stored = self
            .storage
            .upload(MediaUpload {
                path: staged.path().to_path_buf(),
                file_name,
                options: UploadOptions::backend_default(),
            })
            .await?;

        if stored.status != 200 {
            warn!(status = stored.status, "Storage did not accept upload");
            return Err(PostError::UploadRejected {
                status: stored.status,
            });
        }

        let post = self
            .repo
            .create(NewPost {
                user_id,
                caption,
                url: stored.url,
                file_type: FileType::from_content_type(&content_type),
                file_name: stored.name,
            })
            .await?;

        info!(post_id = %post.id, user_id = %post.user_id, file_type = %post.file_type, "Post created");
        Ok(post)
    }

    /// The feed as seen by `viewer`, newest first.
    ///
    /// Without `page` the whole feed is returned and `meta` is omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn feed(&self, viewer: Uuid, page: Option<PageRequest>) -> Result<Feed, PostError> {
        let posts = self.repo.list_newest_first(page).await?;
        let meta = match page {
            Some(page) => Some(PageMeta::new(page, self.repo.count().await?)),
            None => None,
        };

        let mut authors: Vec<Uuid> = posts.iter().map(|p| p.user_id).collect();
        authors.sort_unstable();
        authors.dedup();
        let emails = self.repo.author_emails(&authors).await?;

        Ok(Feed {
            posts: posts
                .into_iter()
                .map(|post| FeedItem::new(post, viewer, &emails))
                .collect(),
            meta,
        })
    }

    /// Delete a post owned by `viewer`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `raw_id` is not a UUID
    /// - The post does not exist
    /// - `viewer` is not the author
    /// - Database operation fails
    pub async fn delete(&self, viewer: Uuid, raw_id: &str) -> Result<DeleteAck, PostError> {
        let id = Uuid::parse_str(raw_id).map_err(|_| PostError::InvalidId(raw_id.to_string()))?;

        let post = self.repo.find_by_id(id).await?.ok_or(PostError::NotFound)?;
        if post.user_id != viewer {
            warn!(post_id = %id, user_id = %viewer, "Refused delete by non-owner");
            return Err(PostError::Forbidden);
        }

        if !self.repo.delete(id).await? {
            return Err(PostError::NotFound);
        }

        info!(post_id = %id, user_id = %viewer, "Post deleted");
        Ok(DeleteAck::deleted())
    }
}
