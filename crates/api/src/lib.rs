//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware and extractor
//! - Error-to-response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use glimpse_core::auth::AuthProvider;
use glimpse_core::storage::StorageService;
use glimpse_shared::EmailService;
use sea_orm::DatabaseConnection;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Pluggable authentication backend.
    pub auth: Arc<dyn AuthProvider>,
    /// Media storage collaborator.
    pub storage: Arc<StorageService>,
    /// Email service for account emails.
    pub email: Arc<EmailService>,
}

/// Permissive CORS: any origin, method and header, with credentials.
///
/// Wildcards cannot be combined with credentials, so the request values are
/// mirrored back instead.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Serves files written by the local filesystem backend under `/media`.
#[must_use]
pub fn with_local_media(router: Router, root: impl Into<PathBuf>) -> Router {
    router.nest_service("/media", ServeDir::new(root.into()))
}
