//! Queue fan-out

use aws_sdk_sqs::Client as SqsClient;
use aws_sdk_sqs::types::SendMessageBatchRequestEntry;
use tracing::{instrument, warn};

use datascan_core::domain::ScanTaskMessage;

use crate::error::IngestError;

/// SQS batch ceiling.
const MAX_BATCH_SIZE: usize = 10;

/// Publishes scan tasks to the work queue in bounded batches.
#[derive(Clone)]
pub struct TaskPublisher {
    client: SqsClient,
    queue_url: String,
}

impl TaskPublisher {
    pub fn new(client: SqsClient, queue_url: String) -> Self {
        Self { client, queue_url }
    }

    /// Publish tasks in batches of up to ten, returning the number the queue
    /// reported as accepted. Per-entry and per-batch failures are logged and
    /// tolerated; the missing units surface later through job progress.
    #[instrument(skip(self, tasks), fields(tasks = tasks.len()))]
    pub async fn publish(&self, tasks: &[ScanTaskMessage]) -> Result<usize, IngestError> {
        let mut enqueued = 0usize;

        for chunk in tasks.chunks(MAX_BATCH_SIZE) {
            let mut entries = Vec::with_capacity(chunk.len());
            for (index, task) in chunk.iter().enumerate() {
                let body = serde_json::to_string(task).map_err(|e| {
                    IngestError::Transport(format!("failed to encode task: {}", e))
                })?;
                let entry = SendMessageBatchRequestEntry::builder()
                    .id(index.to_string())
                    .message_body(body)
                    .build()
                    .map_err(|e| {
                        IngestError::Transport(format!("failed to build batch entry: {}", e))
                    })?;
                entries.push(entry);
            }

            match self
                .client
                .send_message_batch()
                .queue_url(&self.queue_url)
                .set_entries(Some(entries))
                .send()
                .await
            {
                Ok(response) => {
                    enqueued += response.successful().len();
                    for failure in response.failed() {
                        warn!(
                            entry_id = failure.id(),
                            code = failure.code(),
                            "Queue rejected batch entry"
                        );
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to publish task batch");
                }
            }
        }

        Ok(enqueued)
    }
}
