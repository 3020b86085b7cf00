//! Report error types.

use projledger_shared::AppError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A date bound is not `YYYY-MM-DD`.
    #[error("{0}")]
    InvalidDate(String),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidDate(msg) => Self::InvalidArgument(msg),
            ReportError::Store(store) => store.into(),
        }
    }
}
