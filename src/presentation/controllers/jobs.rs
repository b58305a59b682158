//! Job status and administration controllers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use tracing::{error, info};
use uuid::Uuid;

use datascan_core::domain::{JobProgress, JobStatus};
use datascan_store::StoreError;

use crate::presentation::AppState;
use crate::presentation::controllers::{ApiError, api_error};
use crate::presentation::models::{ErrorResponse, JobStatusResponse};

/// GET /api/v1/jobs/{id} - Retrieve job progress
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = JobStatusResponse),
        (status = 400, description = "Malformed job id"),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = match state.store.get_job(id).await {
        Ok(job) => job,
        Err(StoreError::JobNotFound(_)) => {
            return Err(api_error(StatusCode::NOT_FOUND, "job not found"));
        }
        Err(e) => {
            error!(job_id = %id, error = %e, "Failed to retrieve job");
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to retrieve job",
            ));
        }
    };

    let counts = state.store.count_objects_by_status(id).await.map_err(|e| {
        error!(job_id = %id, error = %e, "Failed to count work units");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to retrieve job")
    })?;

    let findings_count = state.store.count_findings(id).await.map_err(|e| {
        error!(job_id = %id, error = %e, "Failed to count findings");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to retrieve job")
    })?;

    Ok(Json(JobStatusResponse {
        job_id: job.job_id,
        bucket: job.bucket,
        prefix: job.prefix,
        status: JobStatus::from_counts(&counts).to_string(),
        created_at: job.created_at,
        updated_at: job.updated_at,
        progress: JobProgress::from_counts(&counts).into(),
        counts: counts.into(),
        findings_count,
    }))
}

/// DELETE /api/v1/jobs/{id} - Administrative deletion, cascading to work
/// units and findings
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 400, description = "Malformed job id"),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match state.store.delete_job(id).await {
        Ok(()) => {
            info!(job_id = %id, "Job deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(StoreError::JobNotFound(_)) => Err(api_error(StatusCode::NOT_FOUND, "job not found")),
        Err(e) => {
            error!(job_id = %id, error = %e, "Failed to delete job");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to delete job",
            ))
        }
    }
}
