//! Core library for datascan
//!
//! Holds the pieces shared by every other crate in the workspace: the
//! domain model (jobs, work units, findings, the queue wire message),
//! the layered configuration loader and the tracing initialization.
//!
//! # Example
//!
//! ```rust,no_run
//! use datascan_core::{Config, init_tracing};
//!
//! let config = Config::load().unwrap_or_default();
//! init_tracing(&config.logging).unwrap();
//! ```

pub mod aws;
pub mod config;
pub mod domain;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
