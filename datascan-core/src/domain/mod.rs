//! Domain model shared across the workspace

pub mod entities;
pub mod messages;

pub use entities::{
    Finding, Job, JobProgress, JobStatus, NewFinding, ObjectStatus, StatusCounts,
};
pub use messages::ScanTaskMessage;
