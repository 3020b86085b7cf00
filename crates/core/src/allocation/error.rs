//! Errors raised by the payment and phase services.

use projledger_shared::AppError;
use projledger_shared::types::{PaymentId, PhaseId, ProjectId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::ledger::AllocationPool;
use crate::store::StoreError;

/// Ways a phase can fall outside its dates or its project's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateRangeViolation {
    /// A supplied date is not `YYYY-MM-DD`.
    #[error("Invalid phase dates")]
    Unparsable,

    /// `end_date` precedes `start_date`.
    #[error("Phase end_date must be on or after start_date")]
    EndBeforeStart,

    /// Phase starts before the project does.
    #[error("Phase start_date must be on or after project start_date")]
    StartsBeforeProject,

    /// Phase ends after the project is due.
    #[error("Phase end_date must be on or before project due_date")]
    EndsAfterProject,
}

/// Errors that can occur while allocating against a project.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Malformed or out-of-range input field.
    #[error("{0}")]
    InvalidArgument(String),

    /// Referenced project does not exist in the caller's company.
    #[error("Invalid project_id for this company")]
    InvalidProject(ProjectId),

    /// Phase dates are inconsistent.
    #[error(transparent)]
    InvalidDateRange(#[from] DateRangeViolation),

    /// Project addressed by the request does not exist.
    #[error("Project not found")]
    ProjectNotFound(ProjectId),

    /// Payment does not exist in the caller's company.
    #[error("Payment not found")]
    PaymentNotFound(PaymentId),

    /// Phase does not exist on the project.
    #[error("Phase not found")]
    PhaseNotFound(PhaseId),

    /// The pool would exceed the project's price.
    #[error(
        "{} would exceed project price. Project price: {ceiling}, allocated: {allocated}, remaining: {remaining}",
        .pool.describe_total()
    )]
    BudgetExceeded {
        /// Pool that was checked.
        pool: AllocationPool,
        /// Project price.
        ceiling: Decimal,
        /// Pool total excluding the record being written.
        allocated: Decimal,
        /// Budget left in the pool; negative when already over.
        remaining: Decimal,
    },

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AllocationError {
    /// Create an invalid argument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        let message = err.to_string();
        match err {
            AllocationError::InvalidArgument(_) => Self::InvalidArgument(message),
            AllocationError::InvalidProject(_) => Self::InvalidReference(message),
            AllocationError::InvalidDateRange(_) => Self::InvalidDateRange(message),
            AllocationError::ProjectNotFound(_)
            | AllocationError::PaymentNotFound(_)
            | AllocationError::PhaseNotFound(_) => Self::NotFound(message),
            AllocationError::BudgetExceeded { remaining, .. } => {
                Self::BudgetExceeded { message, remaining }
            }
            AllocationError::Store(store) => store.into(),
        }
    }
}
