//! Financial aggregation.
//!
//! Turns a company's payment and expense rows into summaries and
//! profitability metrics over an optional date window:
//! - Payments summary (total, count)
//! - Expenses summary (total, count, direct/operational split)
//! - Financial report (gross, operating and net margins)
//! - Project statistics, overview counts and the combined dashboard

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::FinancialAggregator;
pub use types::*;
