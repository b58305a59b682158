//! Ingestion errors

use datascan_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Blob store error: {0}")]
    Transport(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
