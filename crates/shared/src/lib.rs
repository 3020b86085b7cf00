//! Shared types, errors, and configuration for projledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for tenant-scoped entity references
//! - Pagination types for list endpoints
//! - Application-wide error taxonomy
//! - Configuration management
//! - JWT claims and token verification

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, DatabaseConfig, JwtConfig, ServerConfig};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
