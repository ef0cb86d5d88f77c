//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for `user` and `post`
//! - Repositories implementing the core persistence traits
//! - Idempotent schema creation

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{PostRepository, UserRepository};

use glimpse_shared::config::DatabaseConfig;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Creates the `user` and `post` tables if they do not exist yet.
///
/// # Errors
///
/// Returns an error if a schema statement fails.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await?;
    info!("Database schema ready");
    Ok(())
}
