//! Core business logic for projledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the traits in [`store`].
//!
//! # Modules
//!
//! - `amount` - Decimal summation and presentation rounding
//! - `allocation` - Per-project allocation totals and the price ceiling check
//! - `payment` - Payment create/update/delete against the payments pool
//! - `phase` - Budget phases against the phases pool, with date containment
//! - `reports` - Financial aggregation (revenue, expenses, margins)
//! - `store` - Store traits and an in-memory implementation

pub mod allocation;
pub mod amount;
pub mod date;
pub mod payment;
pub mod phase;
pub mod project;
pub mod reports;
pub mod store;
