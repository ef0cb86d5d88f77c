//! Feed posts: upload, listing and owner-only delete.

mod error;
mod service;
mod staging;
mod types;

pub use error::PostError;
pub use service::{PostRepository, PostService};
pub use staging::StagedFile;
pub use types::{
    DELETE_SUCCESS_MESSAGE, DeleteAck, Feed, FeedItem, FileType, NewPost, Post, UNKNOWN_AUTHOR,
    UploadInput,
};

#[cfg(test)]
mod tests;
