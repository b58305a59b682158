//! Request and response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use datascan_core::domain::{Finding, JobProgress, StatusCounts};

/// Body of a scan submission.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScanRequest {
    /// Bucket to scan (required)
    pub bucket: Option<String>,
    /// Optional key prefix; empty means the entire bucket
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateScanResponse {
    pub job_id: Uuid,
    pub message: String,
    pub object_count: usize,
    pub enqueued_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressDto {
    pub total: i64,
    pub completed: i64,
    pub percentage: u32,
}

impl From<JobProgress> for ProgressDto {
    fn from(progress: JobProgress) -> Self {
        Self {
            total: progress.total,
            completed: progress.completed,
            percentage: progress.percentage,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountsDto {
    pub queued: i64,
    pub processing: i64,
    pub succeeded: i64,
    pub failed: i64,
}

impl From<StatusCounts> for CountsDto {
    fn from(counts: StatusCounts) -> Self {
        Self {
            queued: counts.queued,
            processing: counts.processing,
            succeeded: counts.succeeded,
            failed: counts.failed,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub bucket: String,
    pub prefix: String,
    /// pending, running or completed
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub progress: ProgressDto,
    pub counts: CountsDto,
    pub findings_count: i64,
}

/// Query parameters for the findings listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFindingsParams {
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    /// Page size, 1 to 1000 (default 100)
    pub limit: Option<i64>,
    /// Return findings with id strictly greater than this
    pub cursor: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FindingDto {
    /// String-encoded monotonically increasing id
    pub id: String,
    pub job_id: Uuid,
    pub bucket: String,
    pub key: String,
    pub detector: String,
    pub masked_match: String,
    pub context: String,
    pub byte_offset: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Finding> for FindingDto {
    fn from(finding: Finding) -> Self {
        Self {
            id: finding.id.to_string(),
            job_id: finding.job_id,
            bucket: finding.bucket,
            key: finding.key,
            detector: finding.detector,
            masked_match: finding.masked_match,
            context: finding.context,
            byte_offset: finding.byte_offset,
            created_at: finding.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListFindingsResponse {
    pub findings: Vec<FindingDto>,
    pub count: usize,
    /// Last id in the page when the page is full; null otherwise
    pub next_cursor: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_dto_string_encodes_id() {
        let finding = Finding {
            id: 42,
            job_id: Uuid::nil(),
            bucket: "b".to_string(),
            key: "k.txt".to_string(),
            etag: "e".to_string(),
            detector: "SSN".to_string(),
            masked_match: "***-**-6789".to_string(),
            context: "ctx".to_string(),
            byte_offset: 14,
            created_at: Utc::now(),
        };

        let dto = FindingDto::from(finding);
        assert_eq!(dto.id, "42");
        assert_eq!(dto.byte_offset, 14);
    }
}
