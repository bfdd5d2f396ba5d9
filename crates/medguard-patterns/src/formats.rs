//! Format and structure analysis.
//!
//! Classifies a batch code against the known-good pharmaceutical batch
//! formats and scores its structural signals (manufacturer prefix,
//! embedded manufacturing date).

use crate::normalizer;
use lazy_static::lazy_static;
use medguard_registry::{PrefixMatch, PrefixTable};
use regex::Regex;
use serde::Serialize;

/// Score for a full format match
pub const VALID_FORMAT_SCORE: f64 = 85.0;
/// Letters and digits present, no known format
pub const PARTIAL_FORMAT_SCORE: f64 = 50.0;
/// Plausible length, nothing else
pub const LENGTH_ONLY_SCORE: f64 = 40.0;
/// No structural signal at all
pub const NO_FORMAT_SCORE: f64 = 20.0;
/// Bonus for a recognized manufacturer prefix
pub const KNOWN_PREFIX_BONUS: f64 = 10.0;

const STRUCTURE_BASELINE: f64 = 50.0;
const STRUCTURE_KNOWN_PREFIX: f64 = 80.0;
const STRUCTURE_UNKNOWN_PREFIX: f64 = 40.0;
const STRUCTURE_BATCH_KEYWORD: f64 = 60.0;
const STRUCTURE_DATE_BONUS: f64 = 15.0;

lazy_static! {
    /// Known-good formats, in match order
    static ref VALID_FORMATS: Vec<(&'static str, Regex)> = vec![
        ("prefix-digits", Regex::new(r"(?i)^[A-Z]{2,4}-\d{4,6}$").unwrap()),
        ("prefix+digits", Regex::new(r"(?i)^[A-Z]{2,4}\d{6,10}$").unwrap()),
        ("prefix-code-year", Regex::new(r"(?i)^[A-Z]{3}-[A-Z]{2,3}-\d{4}$").unwrap()),
        ("prefix-lot", Regex::new(r"(?i)^[A-Z]{2,3}-[0-9]{2}[A-Z][0-9]{4}$").unwrap()),
        ("batch-number", Regex::new(r"(?i)^BATCH\d{3,6}$").unwrap()),
    ];

    static ref LEADING_PREFIX: Regex = Regex::new(r"^[A-Z]{2,4}").unwrap();

    /// YYYYMMDD anywhere in the code
    static ref EMBEDDED_DATE: Regex =
        Regex::new(r"(20\d{2})(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01])").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatAnalysis {
    pub valid: bool,
    /// Name of the known format that matched
    pub format: Option<&'static str>,
    pub score: f64,
    /// Recognized prefix and the manufacturer it maps to
    pub prefix: Option<String>,
    pub inferred_manufacturer: Option<String>,
}

/// Name of the first known format the code matches
pub fn matching_format(code: &str) -> Option<&'static str> {
    VALID_FORMATS
        .iter()
        .find(|(_, re)| re.is_match(code))
        .map(|(name, _)| *name)
}

pub fn analyze_format(code: &str, prefix: Option<&PrefixMatch<'_>>) -> FormatAnalysis {
    let format = matching_format(code);
    let len = normalizer::char_len(code);

    let mut score = if format.is_some() {
        VALID_FORMAT_SCORE
    } else if normalizer::is_alphanumeric_mix(code) {
        PARTIAL_FORMAT_SCORE
    } else if (5..=20).contains(&len) {
        LENGTH_ONLY_SCORE
    } else {
        NO_FORMAT_SCORE
    };
    if prefix.is_some() {
        score += KNOWN_PREFIX_BONUS;
    }

    FormatAnalysis {
        valid: format.is_some(),
        format,
        score,
        prefix: prefix.map(|m| m.prefix.clone()),
        inferred_manufacturer: prefix.map(|m| m.entry.manufacturer.clone()),
    }
}

/// Structural score: prefix recognition, batch keyword, embedded date
pub fn structure_score(code: &str, table: &PrefixTable) -> f64 {
    let upper = code.to_uppercase();
    let mut score = STRUCTURE_BASELINE;

    if LEADING_PREFIX.is_match(&upper) {
        score = if table.infer(&upper).is_some() {
            STRUCTURE_KNOWN_PREFIX
        } else {
            STRUCTURE_UNKNOWN_PREFIX
        };
    }
    if upper.starts_with("BATCH") {
        score = STRUCTURE_BATCH_KEYWORD;
    }
    if EMBEDDED_DATE.is_match(&upper) {
        score += STRUCTURE_DATE_BONUS;
    }
    score
}
