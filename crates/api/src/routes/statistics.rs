//! Statistics routes: dashboard and financial summaries.
//!
//! Windowed responses echo the requested bounds as `dateRange`, or `null`
//! when no bound was given.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
    routing::get,
};
use projledger_core::reports::{DateRange, DateWindow};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState, AppStore, middleware::AuthUser};

/// Creates the statistics routes (requires auth middleware to be applied externally).
pub fn routes<S: AppStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/statistics", get(get_dashboard::<S>))
        .route("/statistics/financial", get(get_financial_report::<S>))
        .route("/statistics/overview", get(get_overview::<S>))
        .route("/statistics/projects", get(get_project_stats::<S>))
        .route("/statistics/payments", get(get_payments_summary::<S>))
        .route("/statistics/expenses", get(get_expenses_summary::<S>))
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Optional date bounds, `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    /// Earliest date included.
    pub from_date: Option<String>,
    /// Latest date included.
    pub to_date: Option<String>,
}

impl DateRangeQuery {
    fn window(&self) -> Result<DateWindow, ApiError> {
        Ok(DateWindow::parse(
            self.from_date.as_deref(),
            self.to_date.as_deref(),
        )?)
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// A windowed figure together with the window it covers.
#[derive(Debug, Serialize)]
pub struct Windowed<T: Serialize> {
    /// The figures.
    #[serde(flatten)]
    pub data: T,
    /// Echo of the requested bounds.
    #[serde(rename = "dateRange")]
    pub date_range: Option<DateRange>,
}

impl<T: Serialize> Windowed<T> {
    fn new(data: T, window: &DateWindow) -> Self {
        Self {
            data,
            date_range: window.echo(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/statistics` - Full dashboard.
async fn get_dashboard<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let window = query.window()?;
    let dashboard = state.reports.dashboard(auth.company_id(), window).await?;
    Ok(Json(dashboard))
}

/// GET `/statistics/financial` - Profitability report.
async fn get_financial_report<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let window = query.window()?;
    let report = state
        .reports
        .financial_report(auth.company_id(), window)
        .await?;
    Ok(Json(Windowed::new(report, &window)))
}

/// GET `/statistics/overview` - Record counts.
async fn get_overview<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let overview = state.reports.overview(auth.company_id()).await?;
    Ok(Json(overview))
}

/// GET `/statistics/projects` - Project counts by status and total value.
async fn get_project_stats<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.reports.projects(auth.company_id()).await?;
    Ok(Json(stats))
}

/// GET `/statistics/payments` - Payments total and count.
async fn get_payments_summary<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let window = query.window()?;
    let summary = state
        .reports
        .payments_summary(auth.company_id(), window)
        .await?;
    Ok(Json(Windowed::new(summary, &window)))
}

/// GET `/statistics/expenses` - Expenses total, count and split by kind.
async fn get_expenses_summary<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let window = query.window()?;
    let summary = state
        .reports
        .expenses_summary(auth.company_id(), window)
        .await?;
    Ok(Json(Windowed::new(summary, &window)))
}
