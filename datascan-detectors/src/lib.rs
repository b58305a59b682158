//! Sensitive-data detectors
//!
//! Pure, deterministic detection over in-memory text. A [`DetectorEngine`]
//! applies the rule catalogue in declared order and emits one finding per
//! (detector, byte offset) hit, with a masked representation of the match
//! and a bounded context snippet.

pub mod engine;
pub mod rules;
pub mod validators;

pub use engine::{DetectorEngine, ScanObjectRef};
pub use rules::{DetectorRule, MaskRule, default_rules};
