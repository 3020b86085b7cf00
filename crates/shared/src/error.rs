//! Application-wide error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every domain error is converted into one of these kinds before it leaves
/// the core; the HTTP layer only needs `status_code` and `error_code`.
#[derive(Debug, Error)]
pub enum AppError {
    /// No tenant could be resolved for the request.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Malformed or out-of-range primitive (non-positive amount, unknown enum value).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Foreign key target is missing or belongs to another tenant.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Phase/project temporal violation.
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// Target record is absent or belongs to another tenant.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Allocation would exceed the project price.
    #[error("Budget exceeded: {message}")]
    BudgetExceeded {
        /// Human readable description.
        message: String,
        /// Remaining budget in the pool; negative when already over-allocated.
        remaining: Decimal,
    },

    /// Duplicate unique value.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected store failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) => 401,
            Self::InvalidArgument(_)
            | Self::InvalidReference(_)
            | Self::InvalidDateRange(_)
            | Self::BudgetExceeded { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidReference(_) => "INVALID_REFERENCE",
            Self::InvalidDateRange(_) => "INVALID_DATE_RANGE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BudgetExceeded { .. } => "BUDGET_EXCEEDED",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthenticated(msg)
            | Self::InvalidArgument(msg)
            | Self::InvalidReference(msg)
            | Self::InvalidDateRange(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Internal(msg)
            | Self::BudgetExceeded { message: msg, .. } => msg,
        }
    }

    /// Remaining budget carried by `BudgetExceeded`, if any.
    #[must_use]
    pub const fn remaining_budget(&self) -> Option<Decimal> {
        match self {
            Self::BudgetExceeded { remaining, .. } => Some(*remaining),
            _ => None,
        }
    }
}
