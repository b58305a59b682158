//! Scan store repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use datascan_core::domain::{Finding, Job, NewFinding, ObjectStatus, StatusCounts};

use crate::error::StoreError;

/// Filters for paginated finding reads.
#[derive(Debug, Clone, Default)]
pub struct FindingsQuery {
    pub bucket: Option<String>,
    /// Key prefix, matched byte-exactly
    pub prefix: Option<String>,
    pub limit: i64,
    /// Rows with id strictly greater than this are returned
    pub cursor: Option<i64>,
}

/// All reads and writes against the scan schema.
///
/// Holds a bounded pool; callers never see raw connections. Every operation
/// is a single statement or a short transaction.
#[derive(Clone)]
pub struct ScanStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct JobRow {
    job_id: Uuid,
    bucket: String,
    prefix: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            job_id: row.job_id,
            bucket: row.bucket,
            prefix: row.prefix,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FindingRow {
    id: i64,
    job_id: Uuid,
    bucket: String,
    key: String,
    etag: String,
    detector: String,
    masked_match: String,
    context: String,
    byte_offset: i64,
    created_at: DateTime<Utc>,
}

impl From<FindingRow> for Finding {
    fn from(row: FindingRow) -> Self {
        Finding {
            id: row.id,
            job_id: row.job_id,
            bucket: row.bucket,
            key: row.key,
            etag: row.etag,
            detector: row.detector,
            masked_match: row.masked_match,
            context: row.context,
            byte_offset: row.byte_offset,
            created_at: row.created_at,
        }
    }
}

impl ScanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert the job row. Fails on a duplicate id.
    #[instrument(skip(self))]
    pub async fn create_job(
        &self,
        job_id: Uuid,
        bucket: &str,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (job_id, bucket, prefix, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(job_id)
        .bind(bucket)
        .bind(prefix)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(job_id = %job_id, bucket, "Created job");
        Ok(())
    }

    /// Insert a work unit as `queued`; a retry of the same object version is
    /// a no-op on the natural key.
    #[instrument(skip(self))]
    pub async fn upsert_object(
        &self,
        job_id: Uuid,
        bucket: &str,
        key: &str,
        etag: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO job_objects (job_id, bucket, key, etag, status, last_error, updated_at)
            VALUES ($1, $2, $3, $4, $5, NULL, $6)
            ON CONFLICT (job_id, bucket, key, etag) DO NOTHING
            "#,
        )
        .bind(job_id)
        .bind(bucket)
        .bind(key)
        .bind(etag)
        .bind(ObjectStatus::Queued.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update a work unit's status and error note, stamping `updated_at` on
    /// the row and the parent job.
    #[instrument(skip(self, error))]
    pub async fn set_object_status(
        &self,
        job_id: Uuid,
        bucket: &str,
        key: &str,
        etag: &str,
        status: ObjectStatus,
        error: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE job_objects
            SET status = $5, last_error = $6, updated_at = now()
            WHERE job_id = $1 AND bucket = $2 AND key = $3 AND etag = $4
            "#,
        )
        .bind(job_id)
        .bind(bucket)
        .bind(key)
        .bind(etag)
        .bind(status.as_str())
        .bind(error)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            warn!(job_id = %job_id, key, etag, "Status update matched no work unit");
        }

        sqlx::query("UPDATE jobs SET updated_at = now() WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Bulk-insert findings, silently dropping rows already present for the
    /// identity tuple. Returns the count actually inserted.
    #[instrument(skip(self, findings), fields(candidates = findings.len()))]
    pub async fn insert_findings(&self, findings: &[NewFinding]) -> Result<usize, StoreError> {
        if findings.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;

        for finding in findings {
            let result = sqlx::query(
                r#"
                INSERT INTO findings
                    (job_id, bucket, key, etag, detector, masked_match, context, byte_offset)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (bucket, key, etag, detector, byte_offset) DO NOTHING
                "#,
            )
            .bind(finding.job_id)
            .bind(&finding.bucket)
            .bind(&finding.key)
            .bind(&finding.etag)
            .bind(&finding.detector)
            .bind(&finding.masked_match)
            .bind(&finding.context)
            .bind(finding.byte_offset)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;

        debug!(
            inserted,
            deduplicated = findings.len() - inserted,
            "Persisted findings"
        );
        Ok(inserted)
    }

    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: Uuid) -> Result<Job, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT job_id, bucket, prefix, created_at, updated_at
            FROM jobs
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::from).ok_or(StoreError::JobNotFound(job_id))
    }

    /// Administrative deletion; cascades to work units and findings.
    #[instrument(skip(self))]
    pub async fn delete_job(&self, job_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE job_id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::JobNotFound(job_id));
        }

        Ok(())
    }

    /// Per-status counts over a job's work units, zero-filled.
    #[instrument(skip(self))]
    pub async fn count_objects_by_status(&self, job_id: Uuid) -> Result<StatusCounts, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM job_objects
            WHERE job_id = $1
            GROUP BY status
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status.as_str() {
                "queued" => counts.queued = count,
                "processing" => counts.processing = count,
                "succeeded" => counts.succeeded = count,
                "failed" => counts.failed = count,
                other => warn!(status = other, "Unknown status in job_objects"),
            }
        }

        Ok(counts)
    }

    #[instrument(skip(self))]
    pub async fn count_findings(&self, job_id: Uuid) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM findings WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Cursor-paginated findings in strictly ascending id order.
    #[instrument(skip(self))]
    pub async fn list_findings(&self, query: &FindingsQuery) -> Result<Vec<Finding>, StoreError> {
        if !(1..=1000).contains(&query.limit) {
            return Err(StoreError::InvalidLimit(query.limit));
        }

        let rows = sqlx::query_as::<_, FindingRow>(
            r#"
            SELECT id, job_id, bucket, key, etag, detector, masked_match,
                   context, byte_offset, created_at
            FROM findings
            WHERE id > $1
              AND ($2::text IS NULL OR bucket = $2)
              AND ($3::text IS NULL OR starts_with(key, $3))
            ORDER BY id ASC
            LIMIT $4
            "#,
        )
        .bind(query.cursor.unwrap_or(0))
        .bind(query.bucket.as_deref())
        .bind(query.prefix.as_deref())
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Finding::from).collect())
    }
}
