//! Size-checked object retrieval

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use tracing::{debug, instrument};

/// Key suffixes the scanner understands, compared case-insensitively.
const SUPPORTED_EXTENSIONS: [&str; 4] = [".txt", ".csv", ".json", ".log"];

/// Whether the object key carries a supported suffix.
pub fn is_supported_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| lowered.ends_with(ext))
}

/// A fetched object: decoded text plus the entity-tag identifying the
/// version that was read.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub content: String,
    pub etag: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Object is {size} bytes, over the {limit} byte scan limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("Blob store error: {0}")]
    Transport(String),

    #[error("Failed to read object body: {0}")]
    Decode(String),
}

impl FetchError {
    /// TooLarge and NotFound failures repeat identically on redelivery;
    /// retrying them is pointless.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            FetchError::TooLarge { .. } | FetchError::NotFound { .. }
        )
    }
}

/// Retrieval of a single object's text and entity-tag.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<FetchedObject, FetchError>;
}

/// S3-backed fetcher. A metadata probe runs first so oversized objects are
/// rejected without downloading.
#[derive(Clone)]
pub struct S3ObjectFetcher {
    client: S3Client,
    max_object_bytes: u64,
}

impl S3ObjectFetcher {
    pub fn new(client: S3Client, max_object_bytes: u64) -> Self {
        Self {
            client,
            max_object_bytes,
        }
    }
}

#[async_trait]
impl ObjectFetcher for S3ObjectFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, bucket: &str, key: &str) -> Result<FetchedObject, FetchError> {
        let head = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    FetchError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    FetchError::Transport(format!("head failed for {}: {}", key, service_error))
                }
            })?;

        let size = head.content_length().unwrap_or(0).max(0) as u64;
        if size > self.max_object_bytes {
            return Err(FetchError::TooLarge {
                size,
                limit: self.max_object_bytes,
            });
        }

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    FetchError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    FetchError::Transport(format!("get failed for {}: {}", key, service_error))
                }
            })?;

        let etag = response
            .e_tag()
            .or(head.e_tag())
            .unwrap_or_default()
            .trim_matches('"')
            .to_string();

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| FetchError::Decode(format!("body read failed for {}: {}", key, e)))?;

        // Invalid UTF-8 becomes replacement characters, never a failure
        let content = String::from_utf8_lossy(&body.into_bytes()).into_owned();

        debug!(bucket, key, bytes = content.len(), "Fetched object");

        Ok(FetchedObject { content, etag })
    }
}
