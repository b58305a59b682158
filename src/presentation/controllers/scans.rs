//! Scan submission controller

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::error;

use datascan_ingest::IngestError;

use crate::presentation::AppState;
use crate::presentation::controllers::{ApiError, api_error};
use crate::presentation::models::{CreateScanRequest, CreateScanResponse, ErrorResponse};

/// POST /api/v1/scan - Submit a bucket scan
#[utoipa::path(
    post,
    path = "/api/v1/scan",
    request_body = CreateScanRequest,
    responses(
        (status = 200, description = "Scan job created", body = CreateScanResponse),
        (status = 400, description = "Missing bucket", body = ErrorResponse),
        (status = 500, description = "Infrastructure failure", body = ErrorResponse)
    ),
    tag = "scans"
)]
pub async fn create_scan(
    State(state): State<AppState>,
    Json(request): Json<CreateScanRequest>,
) -> Result<Json<CreateScanResponse>, ApiError> {
    let bucket = request
        .bucket
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "bucket is required"))?;

    match state.ingest.scan(bucket, request.prefix.as_deref()).await {
        Ok(submission) => Ok(Json(CreateScanResponse {
            job_id: submission.job_id,
            message: format!("Scan started for bucket {}", bucket),
            object_count: submission.object_count,
            enqueued_count: submission.enqueued_count,
        })),
        Err(IngestError::InvalidRequest(message)) => {
            Err(api_error(StatusCode::BAD_REQUEST, message))
        }
        Err(e) => {
            error!(bucket, error = %e, "Scan submission failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to create scan job",
            ))
        }
    }
}
