//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and applied at startup.

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_and_post;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_user_and_post::Migration)]
    }
}
