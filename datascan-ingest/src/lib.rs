//! Job ingestion pipeline
//!
//! Turns a scan request into a job record, one work-unit row per discovered
//! object, and one queue message per object. Enumeration and fan-out are
//! deliberately not transactional; the client retries at the request level.

pub mod error;
pub mod lister;
pub mod publisher;
pub mod service;

pub use error::IngestError;
pub use lister::{BucketLister, ListedObject};
pub use publisher::TaskPublisher;
pub use service::{IngestService, ScanSubmission};
