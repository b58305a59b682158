//! Scan domain entities

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client-initiated scan over a bucket and optional key prefix.
///
/// Immutable after creation except for `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub bucket: String,
    /// Empty string means the entire bucket
    pub prefix: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a single unit of work (one object version under one job).
///
/// `Succeeded` and `Failed` are terminal for a given entity-tag; a worker
/// observing a non-terminal row may overwrite status freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStatus {
    Queued,
    Processing,
    Succeeded,
    Failed,
}

impl ObjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectStatus::Queued => "queued",
            ObjectStatus::Processing => "processing",
            ObjectStatus::Succeeded => "succeeded",
            ObjectStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ObjectStatus::Succeeded | ObjectStatus::Failed)
    }
}

impl fmt::Display for ObjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(ObjectStatus::Queued),
            "processing" => Ok(ObjectStatus::Processing),
            "succeeded" => Ok(ObjectStatus::Succeeded),
            "failed" => Ok(ObjectStatus::Failed),
            other => Err(format!("unknown object status: {}", other)),
        }
    }
}

/// Per-status counts over a job's objects, zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub queued: i64,
    pub processing: i64,
    pub succeeded: i64,
    pub failed: i64,
}

impl StatusCounts {
    pub fn total(&self) -> i64 {
        self.queued + self.processing + self.succeeded + self.failed
    }

    /// Objects in a terminal state
    pub fn completed(&self) -> i64 {
        self.succeeded + self.failed
    }
}

/// Overall job status derived from the object counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
}

impl JobStatus {
    pub fn from_counts(counts: &StatusCounts) -> Self {
        let total = counts.total();
        if total > 0 && counts.completed() == total {
            JobStatus::Completed
        } else if total > 0 && counts.queued == total {
            JobStatus::Pending
        } else {
            JobStatus::Running
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived progress for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    pub total: i64,
    pub completed: i64,
    pub percentage: u32,
}

impl JobProgress {
    pub fn from_counts(counts: &StatusCounts) -> Self {
        let total = counts.total();
        let completed = counts.completed();
        let percentage = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        Self {
            total,
            completed,
            percentage,
        }
    }
}

/// A persisted detector hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: i64,
    pub job_id: Uuid,
    pub bucket: String,
    pub key: String,
    pub etag: String,
    pub detector: String,
    pub masked_match: String,
    pub context: String,
    pub byte_offset: i64,
    pub created_at: DateTime<Utc>,
}

/// A detector hit pending insertion. The tuple
/// (bucket, key, etag, detector, byte_offset) identifies it globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFinding {
    pub job_id: Uuid,
    pub bucket: String,
    pub key: String,
    pub etag: String,
    pub detector: String,
    pub masked_match: String,
    pub context: String,
    pub byte_offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ObjectStatus::Queued,
            ObjectStatus::Processing,
            ObjectStatus::Succeeded,
            ObjectStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<ObjectStatus>().unwrap(), status);
        }
        assert!("done".parse::<ObjectStatus>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!ObjectStatus::Queued.is_terminal());
        assert!(!ObjectStatus::Processing.is_terminal());
        assert!(ObjectStatus::Succeeded.is_terminal());
        assert!(ObjectStatus::Failed.is_terminal());
    }

    #[test]
    fn progress_for_fully_succeeded_job() {
        let counts = StatusCounts {
            succeeded: 3,
            ..Default::default()
        };
        let progress = JobProgress::from_counts(&counts);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.completed, 3);
        assert_eq!(progress.percentage, 100);
        assert_eq!(JobStatus::from_counts(&counts), JobStatus::Completed);
    }

    #[test]
    fn progress_for_empty_job() {
        let counts = StatusCounts::default();
        let progress = JobProgress::from_counts(&counts);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percentage, 0);
        // No objects discovered yet still reads as running
        assert_eq!(JobStatus::from_counts(&counts), JobStatus::Running);
    }

    #[test]
    fn pending_only_when_everything_is_queued() {
        let counts = StatusCounts {
            queued: 4,
            ..Default::default()
        };
        assert_eq!(JobStatus::from_counts(&counts), JobStatus::Pending);

        let counts = StatusCounts {
            queued: 3,
            processing: 1,
            ..Default::default()
        };
        assert_eq!(JobStatus::from_counts(&counts), JobStatus::Running);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        let counts = StatusCounts {
            queued: 1,
            succeeded: 1,
            failed: 1,
            ..Default::default()
        };
        // 2 of 3 done -> 66.67 -> 67
        assert_eq!(JobProgress::from_counts(&counts).percentage, 67);
    }
}
