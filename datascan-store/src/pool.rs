//! Connection pool construction

use std::time::Duration;

use aws_config::SdkConfig;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing::info;

use datascan_core::config::DatabaseConfig;

use crate::error::StoreError;

/// Credential payload stored in AWS Secrets Manager.
#[derive(Debug, Deserialize)]
struct DatabaseSecret {
    username: String,
    password: String,
    host: String,
    port: u16,
    dbname: String,
}

/// Build a bounded connection pool.
///
/// When `credentials_secret_id` is configured the connection parameters come
/// from Secrets Manager; otherwise the configured URL is used as-is. The
/// pool size is passed by the caller because the ingestor and the worker run
/// with different sizes.
pub async fn build_pool(
    config: &DatabaseConfig,
    max_connections: u32,
    sdk_config: &SdkConfig,
) -> Result<PgPool, StoreError> {
    let mut options = match &config.credentials_secret_id {
        Some(secret_id) => {
            let secret = fetch_secret(secret_id, sdk_config).await?;
            info!(host = %secret.host, dbname = %secret.dbname, "Resolved database credentials from Secrets Manager");
            PgConnectOptions::new()
                .host(&secret.host)
                .port(secret.port)
                .username(&secret.username)
                .password(&secret.password)
                .database(&secret.dbname)
        }
        None => config.url.parse::<PgConnectOptions>()?,
    };

    if config.use_tls {
        options = options.ssl_mode(PgSslMode::Require);
    }

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect_with(options)
        .await?;

    Ok(pool)
}

async fn fetch_secret(
    secret_id: &str,
    sdk_config: &SdkConfig,
) -> Result<DatabaseSecret, StoreError> {
    let client = aws_sdk_secretsmanager::Client::new(sdk_config);

    let value = client
        .get_secret_value()
        .secret_id(secret_id)
        .send()
        .await
        .map_err(|e| StoreError::Credentials(format!("failed to read secret: {}", e)))?;

    let raw = value
        .secret_string()
        .ok_or_else(|| StoreError::Credentials("secret has no string payload".to_string()))?;

    serde_json::from_str(raw)
        .map_err(|e| StoreError::Credentials(format!("malformed secret payload: {}", e)))
}

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
