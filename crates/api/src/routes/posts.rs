//! Feed routes: upload, listing and delete.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State, multipart::MultipartError,
    },
    http::StatusCode,
    routing::{delete, get, post},
};
use glimpse_core::post::{DeleteAck, Feed, Post, PostService, StagedFile, UploadInput};
use glimpse_db::PostRepository;
use glimpse_shared::AppError;
use glimpse_shared::types::PageRequest;
use serde::Deserialize;
use tracing::info;

use crate::{ApiError, AppState, middleware::auth::AuthUser};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Creates the posts router.
pub fn routes() -> Router<AppState> {
    routes_with_upload_limit(MAX_UPLOAD_BYTES)
}

/// Posts router accepting upload bodies of at most `limit` bytes.
pub fn routes_with_upload_limit(limit: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload).layer(DefaultBodyLimit::max(limit)))
        .route("/feed", get(feed))
        .route("/posts/{post_id}", delete(delete_post))
}

fn post_service(state: &AppState) -> PostService<PostRepository> {
    PostService::new(
        state.storage.clone(),
        Arc::new(PostRepository::new((*state.db).clone())),
    )
}

fn bad_multipart(err: &MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError(AppError::PayloadTooLarge(
            "Upload exceeds the size limit".to_string(),
        ))
    } else {
        ApiError(AppError::Validation(err.body_text()))
    }
}

/// POST /upload - Multipart `file` plus optional `caption`.
async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<Post>, ApiError> {
    let mut file = None;
    let mut caption = String::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| bad_multipart(&e))? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let mut staged = StagedFile::create(&file_name)?;
                while let Some(chunk) = field.chunk().await.map_err(|e| bad_multipart(&e))? {
                    staged.write_chunk(&chunk).await?;
                }
                file = Some((file_name, content_type, staged));
            }
            Some("caption") => {
                caption = field.text().await.map_err(|e| bad_multipart(&e))?;
            }
            _ => {}
        }
    }

    let Some((file_name, content_type, staged)) = file else {
        return Err(ApiError(AppError::Validation(
            "Missing file field".to_string(),
        )));
    };

    info!(user_id = %auth.user_id(), %file_name, %content_type, size = staged.size(), "Upload received");

    let post = post_service(&state)
        .upload(UploadInput {
            user_id: auth.user_id(),
            file_name,
            content_type,
            caption,
            staged,
        })
        .await?;

    Ok(Json(post))
}

/// Optional feed pagination.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl FeedQuery {
    fn page_request(&self) -> Option<PageRequest> {
        if self.page.is_none() && self.per_page.is_none() {
            None
        } else {
            Some(PageRequest::from_parts(self.page, self.per_page))
        }
    }
}

/// GET /feed - All posts newest first, or one page when asked.
async fn feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Feed>, ApiError> {
    let feed = post_service(&state)
        .feed(auth.user_id(), query.page_request())
        .await?;
    Ok(Json(feed))
}

/// DELETE /posts/{post_id} - Owner only.
async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<DeleteAck>, ApiError> {
    let ack = post_service(&state)
        .delete(auth.user_id(), &post_id)
        .await?;
    Ok(Json(ack))
}

#[cfg(test)]
#[path = "posts_tests.rs"]
mod tests;
