//! Scanner worker entry point

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use datascan_core::{Config, aws::load_sdk_config, init_tracing};
use datascan_detectors::DetectorEngine;
use datascan_store::{ScanStore, build_pool};
use datascan_worker::{S3ObjectFetcher, Worker, WorkerDeps};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config.logging)?;

    info!("Starting datascan worker");

    if config.aws.queue_url.is_empty() {
        anyhow::bail!("aws.queue_url must be configured");
    }

    let sdk_config = load_sdk_config(&config.aws).await;

    let pool = build_pool(
        &config.database,
        config.worker.db_max_connections,
        &sdk_config,
    )
    .await
    .context("failed to build database pool")?;

    let store = Arc::new(ScanStore::new(pool.clone()));
    let fetcher = Arc::new(S3ObjectFetcher::new(
        aws_sdk_s3::Client::new(&sdk_config),
        config.scanner.max_object_bytes,
    ));
    let engine = Arc::new(DetectorEngine::new());

    let worker = Worker::new(WorkerDeps {
        sqs: aws_sdk_sqs::Client::new(&sdk_config),
        queue_url: config.aws.queue_url.clone(),
        fetcher,
        store,
        engine,
        config: config.worker.clone(),
    });

    let shutdown = CancellationToken::new();
    let worker_token = shutdown.clone();
    let mut handle = tokio::spawn(async move { worker.run(worker_token).await });

    shutdown_signal().await;
    shutdown.cancel();

    // Give the in-flight message a short grace window, then stop hard
    let grace = Duration::from_secs(config.worker.shutdown_grace_seconds);
    if tokio::time::timeout(grace, &mut handle).await.is_err() {
        warn!("In-flight message did not finish within the grace window");
        handle.abort();
    }

    pool.close().await;
    info!("Worker shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
