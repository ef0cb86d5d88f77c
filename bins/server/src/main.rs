//! Glimpse API Server
//!
//! Main entry point for the Glimpse feed backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glimpse_api::{AppState, create_router, with_local_media};
use glimpse_core::auth::JwtAuthProvider;
use glimpse_core::storage::{StorageConfig, StorageProvider, StorageService};
use glimpse_db::{UserRepository, connect, init_schema};
use glimpse_shared::{AppConfig, EmailService, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glimpse=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database and make sure the tables exist
    let db = connect(&config.database).await?;
    init_schema(&db).await?;
    info!("Connected to database");

    // Auth provider over the user table
    let jwt_service = Arc::new(JwtService::new(JwtConfig::from(&config.jwt)));
    let auth = JwtAuthProvider::new(jwt_service, UserRepository::new(db.clone()))
        .require_verified(config.auth.require_verified);

    // Media storage
    let storage_config = StorageConfig::from_settings(&config.storage)?;
    let local_root = match &storage_config.provider {
        StorageProvider::LocalFs { root, .. } => Some(root.clone()),
        StorageProvider::ImageKit { .. } => None,
    };
    let storage = StorageService::from_config(storage_config)?;
    info!(
        provider = storage.provider_name(),
        timeout_secs = config.storage.upload_timeout_secs,
        "Storage configured"
    );

    // Create email service
    let email_service = EmailService::new(config.email.clone());
    info!(
        enabled = config.email.enabled,
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        auth: Arc::new(auth),
        storage: Arc::new(storage),
        email: Arc::new(email_service),
    };

    // Create router
    let mut app = create_router(state);
    if let Some(root) = local_root {
        app = with_local_media(app, root);
    }

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
