//! Repository implementations of the core store traits.
//!
//! [`SeaStore`] hides the `SeaORM` details from the services: it opens one
//! database transaction per [`SeaLedgerSession`] and answers the read-only
//! report queries straight from the pool.

mod finance;
mod ledger;

pub use ledger::SeaLedgerSession;

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbErr};
use std::str::FromStr;
use tracing::error;

use projledger_core::store::StoreError;

/// Prefix of the exception raised by the ceiling triggers.
const CEILING_MARKER: &str = "budget_exceeded remaining=";

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct SeaStore {
    db: DatabaseConnection,
}

impl SeaStore {
    /// Creates a store over a connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Extracts the remaining budget from a ceiling trigger exception.
fn ceiling_violation(message: &str) -> Option<Decimal> {
    let start = message.find(CEILING_MARKER)? + CEILING_MARKER.len();
    let amount: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&amount).ok()
}

/// Maps a database error into the store taxonomy.
pub(crate) fn db_err(err: DbErr) -> StoreError {
    let message = err.to_string();
    if let Some(remaining) = ceiling_violation(&message) {
        return StoreError::CeilingViolation {
            remaining: remaining.normalize(),
        };
    }
    error!(error = %message, "Database operation failed");
    StoreError::database(message)
}
