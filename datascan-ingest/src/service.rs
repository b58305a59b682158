//! Scan ingestion service

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use datascan_core::domain::ScanTaskMessage;
use datascan_store::ScanStore;

use crate::error::IngestError;
use crate::lister::BucketLister;
use crate::publisher::TaskPublisher;

/// Result of a scan submission.
#[derive(Debug, Clone, Copy)]
pub struct ScanSubmission {
    pub job_id: Uuid,
    /// Objects discovered by enumeration
    pub object_count: usize,
    /// Messages the queue reported as accepted
    pub enqueued_count: usize,
}

/// Creates a job, enumerates the bucket and fans work units out to the
/// queue. Runs synchronously on the caller's request.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<ScanStore>,
    lister: BucketLister,
    publisher: TaskPublisher,
}

impl IngestService {
    pub fn new(store: Arc<ScanStore>, lister: BucketLister, publisher: TaskPublisher) -> Self {
        Self {
            store,
            lister,
            publisher,
        }
    }

    /// Submit a scan of `bucket` under the optional key prefix.
    ///
    /// Enumeration, row fan-out and publishing are not one transaction: a
    /// crash midway leaves a job with a partial set of work units, and the
    /// client's retry creates a fresh job.
    #[instrument(skip(self))]
    pub async fn scan(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<ScanSubmission, IngestError> {
        if bucket.trim().is_empty() {
            return Err(IngestError::InvalidRequest(
                "bucket is required".to_string(),
            ));
        }
        let prefix = prefix.unwrap_or("");

        let job_id = Uuid::new_v4();
        self.store
            .create_job(job_id, bucket, prefix, Utc::now())
            .await?;

        let objects = self.lister.list_objects(bucket, prefix).await?;

        let mut tasks = Vec::with_capacity(objects.len());
        for object in &objects {
            self.store
                .upsert_object(job_id, bucket, &object.key, &object.etag, Utc::now())
                .await?;
            tasks.push(ScanTaskMessage {
                job_id,
                bucket: bucket.to_string(),
                key: object.key.clone(),
                etag: object.etag.clone(),
            });
        }

        let enqueued_count = self.publisher.publish(&tasks).await?;
        if enqueued_count < tasks.len() {
            warn!(
                job_id = %job_id,
                published = enqueued_count,
                expected = tasks.len(),
                "Some work units were not enqueued"
            );
        }

        info!(
            job_id = %job_id,
            bucket,
            prefix,
            objects = objects.len(),
            enqueued = enqueued_count,
            "Scan job created"
        );

        Ok(ScanSubmission {
            job_id,
            object_count: objects.len(),
            enqueued_count,
        })
    }
}
