//! Findings listing controller

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use tracing::error;

use datascan_store::FindingsQuery;

use crate::presentation::AppState;
use crate::presentation::controllers::{ApiError, api_error};
use crate::presentation::models::{ErrorResponse, FindingDto, ListFindingsParams, ListFindingsResponse};

const DEFAULT_LIMIT: i64 = 100;

/// GET /api/v1/findings - Page findings by ascending id
#[utoipa::path(
    get,
    path = "/api/v1/findings",
    params(ListFindingsParams),
    responses(
        (status = 200, description = "Findings page", body = ListFindingsResponse),
        (status = 400, description = "Limit out of range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "findings"
)]
pub async fn list_findings(
    State(state): State<AppState>,
    Query(params): Query<ListFindingsParams>,
) -> Result<Json<ListFindingsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=1000).contains(&limit) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "limit must be between 1 and 1000",
        ));
    }

    let query = FindingsQuery {
        bucket: params.bucket,
        prefix: params.prefix,
        limit,
        cursor: params.cursor,
    };

    let findings = state.store.list_findings(&query).await.map_err(|e| {
        error!(error = %e, "Failed to list findings");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to list findings",
        )
    })?;

    // Cursor only continues from a full page; a short page is the last one
    let next_cursor = if findings.len() as i64 == limit {
        findings.last().map(|f| f.id)
    } else {
        None
    };

    let findings: Vec<FindingDto> = findings.into_iter().map(FindingDto::from).collect();

    Ok(Json(ListFindingsResponse {
        count: findings.len(),
        next_cursor,
        findings,
    }))
}
