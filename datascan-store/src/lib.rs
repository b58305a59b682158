//! PostgreSQL store adapter
//!
//! All reads and writes against the relational schema go through
//! [`ScanStore`]. The adapter holds a bounded connection pool, issues only
//! single statements or short transactions, and enforces the uniqueness
//! discipline that makes retries and concurrent workers safe.

pub mod error;
pub mod pool;
pub mod repository;

pub use error::StoreError;
pub use pool::{build_pool, run_migrations};
pub use repository::{FindingsQuery, ScanStore};
