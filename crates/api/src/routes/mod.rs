//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, AppStore, middleware::auth::auth_middleware};

pub mod health;
pub mod payments;
pub mod phases;
pub mod statistics;

/// Creates the `/api/v1` router; every route requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state<S: AppStore>(state: AppState<S>) -> Router<AppState<S>> {
    Router::new()
        .merge(payments::routes())
        .merge(phases::routes())
        .merge(statistics::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ))
}
