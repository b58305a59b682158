//! Queue consumer loop

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_sqs::Client as SqsClient;
use aws_sdk_sqs::types::Message;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use datascan_core::config::WorkerConfig;
use datascan_core::domain::{ObjectStatus, ScanTaskMessage};
use datascan_detectors::{DetectorEngine, ScanObjectRef};
use datascan_store::ScanStore;

use crate::fetcher::{ObjectFetcher, is_supported_key};

/// Note recorded on work units skipped for their file type.
const UNSUPPORTED_NOTE: &str = "Unsupported file type - skipped";

/// What to do with the message after processing.
#[derive(Debug, PartialEq, Eq)]
enum Disposition {
    /// Delete the message; the unit reached a terminal state (or can never
    /// reach one)
    Ack,
    /// Leave the message invisible; the queue redelivers it after the
    /// visibility timeout
    Retry,
}

/// Dependencies injected into the worker.
pub struct WorkerDeps {
    pub sqs: SqsClient,
    pub queue_url: String,
    pub fetcher: Arc<dyn ObjectFetcher>,
    pub store: Arc<ScanStore>,
    pub engine: Arc<DetectorEngine>,
    pub config: WorkerConfig,
}

/// Long-lived consumer owning one queue subscription.
///
/// Processes one message at a time; throughput scales by running more
/// worker replicas, not by intra-process concurrency.
pub struct Worker {
    deps: WorkerDeps,
}

impl Worker {
    pub fn new(deps: WorkerDeps) -> Self {
        Self { deps }
    }

    /// Run until the token is cancelled. The token is checked between
    /// messages; an in-flight message is always finished.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(queue_url = %self.deps.queue_url, "Scanner worker started");

        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.receive() => received,
            };

            match received {
                Ok(messages) => {
                    for message in messages {
                        self.handle_message(&message).await;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Queue receive failed");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(Duration::from_secs(
                            self.deps.config.receive_backoff_seconds,
                        )) => {}
                    }
                }
            }

            if shutdown.is_cancelled() {
                break;
            }
        }

        info!("Scanner worker stopped");
    }

    async fn receive(&self) -> Result<Vec<Message>, String> {
        let response = self
            .deps
            .sqs
            .receive_message()
            .queue_url(&self.deps.queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(self.deps.config.wait_time_seconds)
            .visibility_timeout(self.deps.config.visibility_timeout_seconds)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        Ok(response.messages.unwrap_or_default())
    }

    async fn handle_message(&self, message: &Message) {
        let Some(receipt) = message.receipt_handle() else {
            warn!("Received message without a receipt handle");
            return;
        };
        let body = message.body().unwrap_or_default();

        // Unparseable messages can never succeed; delete them so they do
        // not cycle through the queue.
        let task: ScanTaskMessage = match serde_json::from_str(body) {
            Ok(task) => task,
            Err(e) => {
                warn!(error = %e, "Dropping unparseable message");
                self.ack(receipt).await;
                return;
            }
        };
        if !task.is_well_formed() {
            warn!(job_id = %task.job_id, "Dropping message with missing fields");
            self.ack(receipt).await;
            return;
        }

        if self.process(&task).await == Disposition::Ack {
            self.ack(receipt).await;
        }
    }

    async fn process(&self, task: &ScanTaskMessage) -> Disposition {
        // Mark processing. A failure here is logged but does not abort.
        if let Err(e) = self.mark(task, ObjectStatus::Processing, None).await {
            warn!(job_id = %task.job_id, key = %task.key, error = %e, "Failed to mark work unit processing");
        }

        if !is_supported_key(&task.key) {
            if let Err(e) = self
                .mark(task, ObjectStatus::Succeeded, Some(UNSUPPORTED_NOTE))
                .await
            {
                warn!(job_id = %task.job_id, key = %task.key, error = %e, "Failed to record skip");
            }
            info!(job_id = %task.job_id, key = %task.key, "Skipped unsupported file type");
            return Disposition::Ack;
        }

        let fetched = match self.deps.fetcher.fetch(&task.bucket, &task.key).await {
            Ok(fetched) => fetched,
            Err(e) => {
                let reason = e.to_string();
                if let Err(err) = self
                    .mark(task, ObjectStatus::Failed, Some(&reason))
                    .await
                {
                    warn!(job_id = %task.job_id, key = %task.key, error = %err, "Failed to record fetch failure");
                }
                if e.is_permanent() {
                    // Would fail identically on every redelivery
                    warn!(job_id = %task.job_id, key = %task.key, error = %reason, "Permanent fetch failure");
                    return Disposition::Ack;
                }
                warn!(job_id = %task.job_id, key = %task.key, error = %reason, "Fetch failed; leaving message for redelivery");
                return Disposition::Retry;
            }
        };

        // Findings and status writes key to the tag the ingestor listed; a
        // differing fetch tag means the object changed since enumeration.
        if fetched.etag != task.etag {
            warn!(
                job_id = %task.job_id,
                key = %task.key,
                listed = %task.etag,
                fetched = %fetched.etag,
                "Object version changed since enumeration"
            );
        }

        let object = ScanObjectRef {
            job_id: task.job_id,
            bucket: &task.bucket,
            key: &task.key,
            etag: &task.etag,
        };
        let findings = self.deps.engine.scan(&fetched.content, &object);

        if !findings.is_empty() {
            match self.deps.store.insert_findings(&findings).await {
                Ok(inserted) => {
                    info!(
                        job_id = %task.job_id,
                        key = %task.key,
                        found = findings.len(),
                        inserted,
                        "Recorded findings"
                    );
                }
                Err(e) => {
                    error!(job_id = %task.job_id, key = %task.key, error = %e, "Failed to persist findings");
                    if let Err(err) = self
                        .mark(task, ObjectStatus::Failed, Some(&e.to_string()))
                        .await
                    {
                        warn!(job_id = %task.job_id, error = %err, "Failed to record persistence failure");
                    }
                    return Disposition::Retry;
                }
            }
        }

        if let Err(e) = self.mark(task, ObjectStatus::Succeeded, None).await {
            error!(job_id = %task.job_id, key = %task.key, error = %e, "Failed to mark work unit succeeded");
            return Disposition::Retry;
        }

        Disposition::Ack
    }

    async fn mark(
        &self,
        task: &ScanTaskMessage,
        status: ObjectStatus,
        error: Option<&str>,
    ) -> Result<(), datascan_store::StoreError> {
        self.deps
            .store
            .set_object_status(
                task.job_id,
                &task.bucket,
                &task.key,
                &task.etag,
                status,
                error,
            )
            .await
    }

    async fn ack(&self, receipt: &str) {
        if let Err(e) = self
            .deps
            .sqs
            .delete_message()
            .queue_url(&self.deps.queue_url)
            .receipt_handle(receipt)
            .send()
            .await
        {
            // The message will be redelivered; processing is idempotent, so
            // the retry converges to the same state.
            warn!(error = %e, "Failed to delete message");
        }
    }
}
