//! Known-fake pattern similarity.
//!
//! The rule set is static and versioned with the code. Each matching rule
//! adds a fixed penalty; softer suspicious indicators add a smaller one.

use crate::normalizer;
use lazy_static::lazy_static;
use medguard_policy::{ScoreCard, Thresholds};
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Penalty per matched fake rule
pub const RULE_PENALTY: f64 = 20.0;
/// Penalty per suspicious indicator
pub const INDICATOR_PENALTY: f64 = 10.0;
/// Similarity score ceiling
pub const MAX_SIMILARITY: f64 = 100.0;

lazy_static! {
    static ref FAKE_RULES: Vec<(&'static str, Regex)> = vec![
        ("test_literal", Regex::new(r"(?i)^(FAKE|TEST|DEMO|XXX|000|999)").unwrap()),
        ("zero_padded", Regex::new(r"(?i)^[A-Z]{1,2}-0{4,}").unwrap()),
        ("long_digits", Regex::new(r"^[0-9]{10,}$").unwrap()),
        ("long_letters", Regex::new(r"(?i)^[A-Z]{10,}$").unwrap()),
        ("too_short", Regex::new(r"^.{1,2}$").unwrap()),
        ("keyboard_literal", Regex::new(r"(?i)^(ABC|XYZ|QWE|AAA|BBB|CCC)").unwrap()),
    ];

    static ref SPECIAL_CHARACTER: Regex = Regex::new(r"[^A-Za-z0-9\-_]").unwrap();
    static ref LOWERCASE_ONLY: Regex = Regex::new(r"^[a-z]+$").unwrap();
}

/// Similarity risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityRisk {
    Low,
    Medium,
    High,
}

impl SimilarityRisk {
    pub fn thresholds() -> Thresholds<SimilarityRisk> {
        Thresholds::at_least(
            vec![(50.0, SimilarityRisk::High), (30.0, SimilarityRisk::Medium)],
            SimilarityRisk::Low,
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityRisk::Low => "low",
            SimilarityRisk::Medium => "medium",
            SimilarityRisk::High => "high",
        }
    }
}

impl fmt::Display for SimilarityRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FakeSimilarity {
    pub score: f64,
    /// Names of the fake rules that matched
    pub matched_rules: Vec<&'static str>,
    /// Names of the suspicious indicators present
    pub indicators: Vec<&'static str>,
    pub risk: SimilarityRisk,
}

impl FakeSimilarity {
    /// Any hard fake rule matched
    pub fn matches_known_pattern(&self) -> bool {
        !self.matched_rules.is_empty()
    }
}

pub fn fake_similarity(code: &str) -> FakeSimilarity {
    let mut card = ScoreCard::new(0.0);

    let matched_rules: Vec<&'static str> = FAKE_RULES
        .iter()
        .filter(|(_, re)| re.is_match(code))
        .map(|(name, _)| *name)
        .collect();
    for rule in &matched_rules {
        card.add(*rule, RULE_PENALTY);
    }

    let checks = [
        ("special_character", SPECIAL_CHARACTER.is_match(code)),
        (
            "repeated_digits",
            normalizer::longest_run_by(code, |c| c.is_ascii_digit()) >= 5,
        ),
        (
            "repeated_letters",
            normalizer::longest_run_by(code, |c| c.is_ascii_uppercase()) >= 4,
        ),
        ("lowercase_only", LOWERCASE_ONLY.is_match(code)),
    ];
    let indicators: Vec<&'static str> = checks
        .iter()
        .filter(|(_, hit)| *hit)
        .map(|(name, _)| *name)
        .collect();
    for indicator in &indicators {
        card.add(*indicator, INDICATOR_PENALTY);
    }

    let score = card.clamped(0.0, MAX_SIMILARITY);
    FakeSimilarity {
        score,
        matched_rules,
        indicators,
        risk: SimilarityRisk::thresholds().bucket(score),
    }
}
