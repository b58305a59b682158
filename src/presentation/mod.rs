//! HTTP presentation layer

pub mod controllers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use datascan_core::Config;
use datascan_ingest::IngestService;
use datascan_store::ScanStore;

pub use routes::create_router;

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ScanStore>,
    pub ingest: Arc<IngestService>,
    pub config: Arc<Config>,
}
