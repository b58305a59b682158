//! Bucket enumeration

use aws_sdk_s3::Client as S3Client;
use tracing::{debug, instrument};

use crate::error::IngestError;

/// Keys requested per listing page (the S3 maximum).
const PAGE_SIZE: i32 = 1000;

/// An object discovered during enumeration.
#[derive(Debug, Clone)]
pub struct ListedObject {
    pub key: String,
    /// Entity-tag with surrounding quotes stripped
    pub etag: String,
    pub size: i64,
}

/// Pages through a bucket listing, following continuation tokens until
/// exhausted.
#[derive(Clone)]
pub struct BucketLister {
    client: S3Client,
}

impl BucketLister {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Enumerate every non-empty object under the prefix (empty prefix means
    /// the whole bucket). Zero-size objects, including directory markers,
    /// are filtered out.
    #[instrument(skip(self))]
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ListedObject>, IngestError> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .max_keys(PAGE_SIZE);

            if !prefix.is_empty() {
                request = request.prefix(prefix);
            }

            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                IngestError::Transport(format!("failed to list objects in {}: {}", bucket, e))
            })?;

            for object in response.contents() {
                let Some(key) = object.key() else { continue };
                if object.size().unwrap_or(0) <= 0 {
                    continue;
                }

                objects.push(ListedObject {
                    key: key.to_string(),
                    etag: object.e_tag().unwrap_or_default().trim_matches('"').to_string(),
                    size: object.size().unwrap_or(0),
                });
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        debug!(bucket, prefix, count = objects.len(), "Bucket enumeration complete");
        Ok(objects)
    }
}
