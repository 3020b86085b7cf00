//! Database layer with `SeaORM` entities, migrations and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Database migrations, including the allocation ceiling triggers
//! - [`SeaStore`], the PostgreSQL implementation of the core store traits

pub mod entities;
pub mod migration;
pub mod repositories;

pub use migration::Migrator;
pub use repositories::{SeaLedgerSession, SeaStore};

use projledger_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
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
