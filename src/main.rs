//! Datascan - API server entry point

use std::{net::SocketAddr, sync::Arc};

use tokio::{net::TcpListener, signal};

use datascan::presentation::AppState;
use datascan::{Config, create_router, init_tracing};
use datascan_core::aws::load_sdk_config;
use datascan_ingest::{BucketLister, IngestService, TaskPublisher};
use datascan_store::{ScanStore, build_pool, run_migrations};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!("Starting datascan API server...");
    tracing::info!(
        "Configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    let sdk_config = load_sdk_config(&config.aws).await;

    let pool = build_pool(
        &config.database,
        config.database.max_connections,
        &sdk_config,
    )
    .await?;

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let store = Arc::new(ScanStore::new(pool.clone()));

    let ingest = Arc::new(IngestService::new(
        store.clone(),
        BucketLister::new(aws_sdk_s3::Client::new(&sdk_config)),
        TaskPublisher::new(
            aws_sdk_sqs::Client::new(&sdk_config),
            config.aws.queue_url.clone(),
        ),
    ));

    let state = AppState {
        store,
        ingest,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state, &config);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Server listening on {}", addr);
    if config.server.enable_docs {
        tracing::info!(
            "OpenAPI document available at http://{}/api-docs/openapi.json",
            addr
        );
    }

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server shutdown complete");
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
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
