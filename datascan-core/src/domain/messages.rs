//! Queue wire messages

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message published per discovered object and consumed by the worker.
///
/// Every field is required on the wire; a message that fails to parse or
/// carries empty fields is unrecoverable and must be dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTaskMessage {
    pub job_id: Uuid,
    pub bucket: String,
    pub key: String,
    pub etag: String,
}

impl ScanTaskMessage {
    /// A message with an empty bucket, key or entity-tag cannot address its
    /// work unit and must be dropped rather than retried.
    pub fn is_well_formed(&self) -> bool {
        !self.bucket.is_empty() && !self.key.is_empty() && !self.etag.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_message() {
        let body = r#"{"job_id":"0cb4cabe-c1ad-4697-9c43-34c4e5a42b4d","bucket":"data","key":"logs/app.log","etag":"abc123"}"#;
        let message: ScanTaskMessage = serde_json::from_str(body).unwrap();
        assert_eq!(message.bucket, "data");
        assert_eq!(message.key, "logs/app.log");
        assert_eq!(message.etag, "abc123");
        assert!(message.is_well_formed());
    }

    #[test]
    fn missing_required_fields_fail_to_parse() {
        // No job_id
        assert!(
            serde_json::from_str::<ScanTaskMessage>(
                r#"{"bucket":"data","key":"a.txt","etag":"abc123"}"#
            )
            .is_err()
        );
        // No etag
        assert!(
            serde_json::from_str::<ScanTaskMessage>(
                r#"{"job_id":"0cb4cabe-c1ad-4697-9c43-34c4e5a42b4d","bucket":"data","key":"a.txt"}"#
            )
            .is_err()
        );
        assert!(serde_json::from_str::<ScanTaskMessage>("not json").is_err());
    }

    #[test]
    fn empty_fields_are_malformed() {
        let body = r#"{"job_id":"0cb4cabe-c1ad-4697-9c43-34c4e5a42b4d","bucket":"data","key":"","etag":"abc123"}"#;
        let message: ScanTaskMessage = serde_json::from_str(body).unwrap();
        assert!(!message.is_well_formed());

        let body = r#"{"job_id":"0cb4cabe-c1ad-4697-9c43-34c4e5a42b4d","bucket":"data","key":"a.txt","etag":""}"#;
        let message: ScanTaskMessage = serde_json::from_str(body).unwrap();
        assert!(!message.is_well_formed());
    }

    #[test]
    fn round_trips_through_json() {
        let message = ScanTaskMessage {
            job_id: Uuid::new_v4(),
            bucket: "data".to_string(),
            key: "a.txt".to_string(),
            etag: "abc123".to_string(),
        };
        let body = serde_json::to_string(&message).unwrap();
        assert_eq!(
            serde_json::from_str::<ScanTaskMessage>(&body).unwrap(),
            message
        );
    }
}
