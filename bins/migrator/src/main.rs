//! Database migration runner for projledger.
//!
//! Reads `DATABASE_URL` (or `--database-url`).
//!
//! Usage:
//!   migrator up      - Run all pending migrations, including the ceiling triggers
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations

use projledger_db::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Run the migrator CLI (it sets up its own tracing)
    cli::run_cli(Migrator).await;
}
