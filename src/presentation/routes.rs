//! Router assembly and OpenAPI document

use std::time::Duration;

use axum::Router;
use axum::response::Json;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use datascan_core::Config;

use super::AppState;
use super::controllers::{findings, health, jobs, scans};
use super::models::{
    CountsDto, CreateScanRequest, CreateScanResponse, ErrorResponse, FindingDto, HealthResponse,
    JobStatusResponse, ListFindingsResponse, ProgressDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        scans::create_scan,
        jobs::get_job,
        jobs::delete_job,
        findings::list_findings,
        health::health,
    ),
    components(schemas(
        CreateScanRequest,
        CreateScanResponse,
        JobStatusResponse,
        ProgressDto,
        CountsDto,
        FindingDto,
        ListFindingsResponse,
        HealthResponse,
        ErrorResponse,
    )),
    tags(
        (name = "scans", description = "Scan submission"),
        (name = "jobs", description = "Job progress and administration"),
        (name = "findings", description = "Paginated findings"),
        (name = "health", description = "Service health")
    ),
    info(
        title = "Datascan API",
        description = "Sensitive-data discovery over blob-store objects"
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router.
pub fn create_router(state: AppState, config: &Config) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/scan", post(scans::create_scan))
        .route(
            "/api/v1/jobs/{id}",
            get(jobs::get_job).delete(jobs::delete_job),
        )
        .route("/api/v1/findings", get(findings::list_findings))
        .with_state(state);

    if config.server.enable_docs {
        router = router.route("/api-docs/openapi.json", get(openapi_json));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_seconds,
            ))),
    )
}
