//! Payment routes.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use projledger_core::payment::{CreatePaymentInput, PaymentFilter, UpdatePaymentInput};
use projledger_shared::types::{ClientId, PageRequest, PaymentId, ProjectId};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiError, AppState, AppStore, middleware::AuthUser};

/// Creates the payment routes (requires auth middleware to be applied externally).
pub fn routes<S: AppStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/payments",
            get(list_payments::<S>).post(create_payment::<S>),
        )
        .route(
            "/payments/{payment_id}",
            get(get_payment::<S>)
                .put(update_payment::<S>)
                .delete(delete_payment::<S>),
        )
        .route(
            "/projects/{project_id}/payments",
            get(list_project_payments::<S>),
        )
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters for listing payments.
#[derive(Debug, Default, Deserialize)]
pub struct ListPaymentsQuery {
    /// Only payments of this project.
    pub project_id: Option<ProjectId>,
    /// Only payments of projects billed to this client.
    pub client_id: Option<ClientId>,
    /// Page number, from 1.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

impl ListPaymentsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/payments` - List payments, newest first.
async fn list_payments<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    query: Result<Query<ListPaymentsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let filter = PaymentFilter {
        project_id: query.project_id,
        client_id: query.client_id,
    };

    let page = state
        .payments
        .list(auth.company_id(), filter, query.page_request())
        .await?;
    Ok(Json(page))
}

/// POST `/payments` - Record a payment against a project.
async fn create_payment<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    payload: Result<Json<CreatePaymentInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let payment = state.payments.create(auth.company_id(), input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET `/payments/{payment_id}` - Fetch one payment.
async fn get_payment<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    path: Result<Path<PaymentId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(payment_id) = path?;
    let payment = state.payments.get(auth.company_id(), payment_id).await?;
    Ok(Json(payment))
}

/// PUT `/payments/{payment_id}` - Partially update a payment.
async fn update_payment<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    path: Result<Path<PaymentId>, PathRejection>,
    payload: Result<Json<UpdatePaymentInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(payment_id) = path?;
    let Json(input) = payload?;
    let payment = state
        .payments
        .update(auth.company_id(), payment_id, input)
        .await?;
    Ok(Json(payment))
}

/// DELETE `/payments/{payment_id}` - Remove a payment.
async fn delete_payment<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    path: Result<Path<PaymentId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(payment_id) = path?;
    state.payments.delete(auth.company_id(), payment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/projects/{project_id}/payments` - Every payment of a project.
async fn list_project_payments<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    path: Result<Path<ProjectId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(project_id) = path?;
    let payments = state
        .payments
        .list_for_project(auth.company_id(), project_id)
        .await?;
    Ok(Json(json!({ "data": payments })))
}
