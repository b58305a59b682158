//! Property-based tests for the detector library

use datascan_detectors::validators::luhn_valid;
use datascan_detectors::{DetectorEngine, ScanObjectRef};
use proptest::prelude::*;
use uuid::Uuid;

fn object() -> ScanObjectRef<'static> {
    ScanObjectRef {
        job_id: Uuid::nil(),
        bucket: "bucket",
        key: "key.txt",
        etag: "etag",
    }
}

/// Reference Luhn implementation, written independently of the production one.
fn luhn_reference(digits: &str) -> bool {
    let mut sum = 0u32;
    let mut double = false;
    for c in digits.chars().rev() {
        let mut d = c.to_digit(10).unwrap();
        if double {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
        double = !double;
    }
    sum % 10 == 0
}

proptest! {
    #[test]
    fn scanning_twice_is_deterministic(content in ".{0,400}") {
        let engine = DetectorEngine::new();
        let first = engine.scan(&content, &object());
        let second = engine.scan(&content, &object());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn luhn_matches_reference(digits in "[0-9]{13,19}") {
        prop_assert_eq!(luhn_valid(&digits), luhn_reference(&digits));
    }

    #[test]
    fn appending_check_digit_always_validates(body in "[0-9]{12,18}") {
        // Compute the check digit that makes the Luhn sum 0 mod 10
        let check = (0..10u8)
            .find(|d| luhn_reference(&format!("{}{}", body, d)))
            .unwrap();
        let candidate = format!("{}{}", body, check);
        prop_assert!(luhn_valid(&candidate));
    }

    #[test]
    // Padding alphabet is disjoint from every gate keyword's letters, so the
    // only keyword occurrence is the one planted deliberately.
    fn gated_match_admitted_iff_keyword_in_window(padding in "[xyz ]{0,80}") {
        let engine = DetectorEngine::new();

        let with_keyword = format!("phone {}555-123-4567", padding);
        let findings = engine.scan(&with_keyword, &object());
        prop_assert!(
            findings.iter().any(|f| f.detector == "US_PHONE"),
            "keyword within the window must admit the match"
        );

        let without_keyword = format!("{}555-123-4567", padding);
        let findings = engine.scan(&without_keyword, &object());
        prop_assert!(
            findings.iter().all(|f| f.detector != "US_PHONE"),
            "no keyword in the window must reject the match"
        );
    }

    #[test]
    fn offsets_are_valid_match_starts(content in "[ -~]{0,300}") {
        let engine = DetectorEngine::new();
        for finding in engine.scan(&content, &object()) {
            let offset = finding.byte_offset as usize;
            prop_assert!(offset < content.len());
            prop_assert!(content.is_char_boundary(offset));
        }
    }
}
