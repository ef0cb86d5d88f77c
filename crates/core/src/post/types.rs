//! Post domain types.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use glimpse_shared::types::PageMeta;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::staging::StagedFile;

/// Email shown for posts whose author no longer exists.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Message returned after a successful delete.
pub const DELETE_SUCCESS_MESSAGE: &str = "Post Deleted Successfully";

/// Kind of media behind a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

impl FileType {
    /// `video/*` is a video, everything else is treated as an image.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("video/")
        {
            Self::Video
        } else {
            Self::Image
        }
    }

    /// Stored string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post ID.
    pub id: Uuid,
    /// Author.
    pub user_id: Uuid,
    /// Caption, possibly empty.
    pub caption: String,
    /// Public media URL.
    pub url: String,
    /// Media kind.
    pub file_type: FileType,
    /// Name the storage provider gave the file.
    pub file_name: String,
    /// Insert time.
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Author.
    pub user_id: Uuid,
    /// Caption, possibly empty.
    pub caption: String,
    /// Public media URL.
    pub url: String,
    /// Media kind.
    pub file_type: FileType,
    /// Stored file name.
    pub file_name: String,
}

/// An upload received from a client.
#[derive(Debug)]
pub struct UploadInput {
    /// Uploading user.
    pub user_id: Uuid,
    /// Client-side file name.
    pub file_name: String,
    /// Declared content type.
    pub content_type: String,
    /// Caption, possibly empty.
    pub caption: String,
    /// Payload already written to local disk.
    pub staged: StagedFile,
}

/// A post as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Post ID.
    pub id: Uuid,
    /// Author.
    pub user_id: Uuid,
    /// Caption.
    pub caption: String,
    /// Public media URL.
    pub url: String,
    /// Media kind.
    pub file_type: FileType,
    /// Stored file name.
    pub file_name: String,
    /// Insert time.
    pub created_at: DateTime<Utc>,
    /// Whether the viewer authored the post.
    pub is_owner: bool,
    /// Author email, or [`UNKNOWN_AUTHOR`].
    pub email: String,
}

impl FeedItem {
    /// Decorate `post` for `viewer`.
    #[must_use]
    pub fn new(post: Post, viewer: Uuid, emails: &HashMap<Uuid, String>) -> Self {
        let email = emails
            .get(&post.user_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        Self {
            is_owner: post.user_id == viewer,
            email,
            id: post.id,
            user_id: post.user_id,
            caption: post.caption,
            url: post.url,
            file_type: post.file_type,
            file_name: post.file_name,
            created_at: post.created_at,
        }
    }
}

/// Feed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// Posts, newest first.
    pub posts: Vec<FeedItem>,
    /// Present only for paginated requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

/// Delete acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    /// Always true.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl DeleteAck {
    /// The acknowledgement for a removed post.
    #[must_use]
    pub fn deleted() -> Self {
        Self {
            success: true,
            message: DELETE_SUCCESS_MESSAGE.to_string(),
        }
    }
}
