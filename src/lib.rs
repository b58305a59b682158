//! Datascan - HTTP API over the scan core
//!
//! The thin request/response shell: controllers map one-to-one onto the
//! core operations (submit a scan, read job progress, page findings).

pub mod presentation;

pub use datascan_core::{Config, init_tracing};
pub use presentation::{AppState, create_router};

// Re-export for convenience
pub use datascan_core;
pub use datascan_ingest;
pub use datascan_store;
