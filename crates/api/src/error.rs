//! Error responses.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <text>}`;
//! a budget rejection also carries `"remaining"`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use projledger_core::allocation::AllocationError;
use projledger_core::reports::ReportError;
use projledger_shared::AppError;
use serde_json::json;
use tracing::error;

/// An [`AppError`] on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Returns the wrapped error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.0
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        Self(err.into())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::InvalidArgument(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::InvalidArgument(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AppError::InvalidArgument(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let AppError::Internal(detail) = &err {
            error!(error = %detail, "Request failed");
            return (
                status,
                Json(json!({
                    "error": err.error_code(),
                    "message": "An error occurred"
                })),
            )
                .into_response();
        }

        let mut body = json!({
            "error": err.error_code(),
            "message": err.message(),
        });
        if let Some(remaining) = err.remaining_budget() {
            body["remaining"] =
                rust_decimal::serde::float::serialize(&remaining, serde_json::value::Serializer)
                    .unwrap_or(serde_json::Value::Null);
        }

        (status, Json(body)).into_response()
    }
}
