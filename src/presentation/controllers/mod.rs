//! HTTP controllers

pub mod findings;
pub mod health;
pub mod jobs;
pub mod scans;

use axum::Json;
use axum::http::StatusCode;

use super::models::ErrorResponse;

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
