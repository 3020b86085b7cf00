//! Project allocation accounting.
//!
//! A project's `price` caps two independent pools: the sum of its payments
//! and the sum of its budget phases. This module computes the current total
//! of a pool and decides whether a proposed amount still fits.
//!
//! - `ledger` - Current allocation totals, with an "exclude this record" mode
//! - `validator` - The ceiling check
//! - `error` - Errors shared by the payment and phase services

pub mod error;
pub mod ledger;
pub mod validator;

#[cfg(test)]
mod props;

pub use error::{AllocationError, DateRangeViolation};
pub use ledger::{AllocationLedger, AllocationPool, AllocationRecord};
pub use validator::{AllocationCheck, AllocationValidator};
