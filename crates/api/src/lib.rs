//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for payments, phases and statistics
//! - Authentication middleware
//! - Error responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use projledger_core::payment::PaymentService;
use projledger_core::phase::PhaseService;
use projledger_core::reports::FinancialAggregator;
use projledger_core::store::{FinanceStore, LedgerStore};
use projledger_shared::JwtService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Store requirements of the HTTP layer.
pub trait AppStore: LedgerStore + FinanceStore {}

impl<T: LedgerStore + FinanceStore> AppStore for T {}

/// Application state shared across handlers.
pub struct AppState<S: AppStore> {
    /// Payment allocation service.
    pub payments: PaymentService<S>,
    /// Phase allocation service.
    pub phases: PhaseService<S>,
    /// Financial reports.
    pub reports: FinancialAggregator<S>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
}

impl<S: AppStore> AppState<S> {
    /// Builds the services over one store.
    pub fn new(store: Arc<S>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            payments: PaymentService::new(Arc::clone(&store)),
            phases: PhaseService::new(Arc::clone(&store)),
            reports: FinancialAggregator::new(store),
            jwt_service,
        }
    }
}

impl<S: AppStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            payments: self.payments.clone(),
            phases: self.phases.clone(),
            reports: self.reports.clone(),
            jwt_service: Arc::clone(&self.jwt_service),
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: AppStore>(state: AppState<S>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
