//! Store adapter errors

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Limit must be between 1 and 1000, got {0}")]
    InvalidLimit(i64),

    #[error("Credential resolution failed: {0}")]
    Credentials(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
