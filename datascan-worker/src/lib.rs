//! Scanner worker
//!
//! A long-running consumer that takes scan tasks off the queue one at a
//! time, fetches the object, runs the detector catalogue over it and
//! records findings and terminal status. Retries rely on queue redelivery:
//! the worker simply does not acknowledge on failure.

pub mod consumer;
pub mod fetcher;

pub use consumer::{Worker, WorkerDeps};
pub use fetcher::{FetchError, FetchedObject, ObjectFetcher, S3ObjectFetcher, is_supported_key};
