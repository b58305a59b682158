//! Default detector rules

use regex::Regex;

use super::{DetectorRule, MaskRule};
use crate::validators::credit_card_valid;

/// The full detector catalogue, in application order.
pub fn default_rules() -> Vec<DetectorRule> {
    vec![
        ssn_rule(),
        credit_card_rule(),
        aws_access_key_rule(),
        aws_secret_key_rule(),
        email_rule(),
        us_phone_rule(),
    ]
}

/// US Social Security Number
pub fn ssn_rule() -> DetectorRule {
    DetectorRule {
        name: "SSN",
        patterns: compile(&[r"\b\d{3}-\d{2}-\d{4}\b"]),
        keywords: &["ssn", "social security", "social-security", "ss#", "ss #"],
        validator: None,
        mask: MaskRule::SsnLastFour,
    }
}

/// Payment card number, 13-19 digits with optional internal spaces or dashes
pub fn credit_card_rule() -> DetectorRule {
    DetectorRule {
        name: "CREDIT_CARD",
        patterns: compile(&[r"\b\d(?:[ -]?\d){12,18}\b"]),
        keywords: &[
            "card",
            "credit",
            "visa",
            "mastercard",
            "amex",
            "discover",
            "payment",
        ],
        validator: Some(credit_card_valid),
        mask: MaskRule::CardLastFour,
    }
}

/// AWS access key ID; the AKIA prefix self-identifies, no gate needed
pub fn aws_access_key_rule() -> DetectorRule {
    DetectorRule {
        name: "AWS_ACCESS_KEY",
        patterns: compile(&[r"\bAKIA[0-9A-Z]{16}\b"]),
        keywords: &[],
        validator: None,
        mask: MaskRule::AwsAccessKey,
    }
}

/// AWS secret access key. The bare 40-character pattern is noisy; the
/// context gate is the only discriminator.
pub fn aws_secret_key_rule() -> DetectorRule {
    DetectorRule {
        name: "AWS_SECRET_KEY",
        patterns: compile(&[r"\b[A-Za-z0-9/+=]{40}\b"]),
        keywords: &["secret", "aws_secret", "secret_access_key"],
        validator: None,
        mask: MaskRule::SecretLastFour,
    }
}

/// Email address, RFC-loose
pub fn email_rule() -> DetectorRule {
    DetectorRule {
        name: "EMAIL",
        patterns: compile(&[r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"]),
        keywords: &[],
        validator: None,
        mask: MaskRule::EmailLocalPrefix,
    }
}

/// US phone number in common formats. Sub-patterns are applied in declared
/// order and may overlap; dedup happens downstream on (detector, offset).
pub fn us_phone_rule() -> DetectorRule {
    DetectorRule {
        name: "US_PHONE",
        patterns: compile(&[
            r"\b\d{3}-\d{3}-\d{4}\b",
            r"\(\d{3}\) \d{3}-\d{4}\b",
            r"\b\d{3}\.\d{3}\.\d{4}\b",
            r"\b\d{10}\b",
            r"\b1-\d{3}-\d{3}-\d{4}\b",
        ]),
        keywords: &["phone", "tel", "telephone", "mobile", "cell"],
        validator: None,
        mask: MaskRule::PhoneLastFour,
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("detector pattern must compile"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_order_is_stable() {
        let names: Vec<&str> = default_rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "SSN",
                "CREDIT_CARD",
                "AWS_ACCESS_KEY",
                "AWS_SECRET_KEY",
                "EMAIL",
                "US_PHONE"
            ]
        );
    }

    #[test]
    fn every_pattern_compiles() {
        for rule in default_rules() {
            assert!(!rule.patterns.is_empty(), "{} has no patterns", rule.name);
        }
    }

    #[test]
    fn ungated_rules_are_the_self_identifying_ones() {
        for rule in default_rules() {
            let gated = !rule.keywords.is_empty();
            match rule.name {
                "AWS_ACCESS_KEY" | "EMAIL" => assert!(!gated),
                _ => assert!(gated, "{} should carry gate keywords", rule.name),
            }
        }
    }
}
