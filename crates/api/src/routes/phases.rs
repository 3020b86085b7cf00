//! Budget phase routes, nested under their project.

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
use projledger_core::phase::{CreatePhaseInput, UpdatePhaseInput};
use projledger_shared::types::{PageRequest, PhaseId, ProjectId};
use serde::Deserialize;

use crate::{ApiError, AppState, AppStore, middleware::AuthUser};

/// Creates the phase routes (requires auth middleware to be applied externally).
pub fn routes<S: AppStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/projects/{project_id}/phases",
            get(list_phases::<S>).post(create_phase::<S>),
        )
        .route(
            "/projects/{project_id}/phases/{phase_id}",
            get(get_phase::<S>)
                .put(update_phase::<S>)
                .delete(delete_phase::<S>),
        )
}

/// Query parameters for listing phases.
#[derive(Debug, Default, Deserialize)]
pub struct ListPhasesQuery {
    /// Page number, from 1.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

/// GET `/projects/{project_id}/phases` - List a project's phases.
async fn list_phases<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    path: Result<Path<ProjectId>, PathRejection>,
    query: Result<Query<ListPhasesQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(project_id) = path?;
    let Query(query) = query?;
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        query.page.unwrap_or(defaults.page),
        query.limit.unwrap_or(defaults.limit),
    );

    let phases = state
        .phases
        .list(auth.company_id(), project_id, page)
        .await?;
    Ok(Json(phases))
}

/// POST `/projects/{project_id}/phases` - Add a phase.
async fn create_phase<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    path: Result<Path<ProjectId>, PathRejection>,
    payload: Result<Json<CreatePhaseInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(project_id) = path?;
    let Json(input) = payload?;
    let phase = state
        .phases
        .create(auth.company_id(), project_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(phase)))
}

/// GET `/projects/{project_id}/phases/{phase_id}` - Fetch one phase.
async fn get_phase<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    path: Result<Path<(ProjectId, PhaseId)>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path((project_id, phase_id)) = path?;
    let phase = state
        .phases
        .get(auth.company_id(), project_id, phase_id)
        .await?;
    Ok(Json(phase))
}

/// PUT `/projects/{project_id}/phases/{phase_id}` - Partially update a phase.
async fn update_phase<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    path: Result<Path<(ProjectId, PhaseId)>, PathRejection>,
    payload: Result<Json<UpdatePhaseInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path((project_id, phase_id)) = path?;
    let Json(input) = payload?;
    let phase = state
        .phases
        .update(auth.company_id(), project_id, phase_id, input)
        .await?;
    Ok(Json(phase))
}

/// DELETE `/projects/{project_id}/phases/{phase_id}` - Remove a phase.
async fn delete_phase<S: AppStore>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    path: Result<Path<(ProjectId, PhaseId)>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path((project_id, phase_id)) = path?;
    state
        .phases
        .delete(auth.company_id(), project_id, phase_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
