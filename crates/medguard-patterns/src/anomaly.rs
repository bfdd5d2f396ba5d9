//! Heuristic anomaly pass over a batch code.

use crate::normalizer;
use medguard_policy::ScoreCard;
use serde::Serialize;

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 25;

const LENGTH_PENALTY: f64 = 15.0;
const REPETITION_PENALTY: f64 = 20.0;
const LOW_DIVERSITY_PENALTY: f64 = 15.0;
const UNIFORM_PENALTY: f64 = 10.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub score: f64,
    /// Length outside [MIN_LENGTH, MAX_LENGTH]
    pub length: bool,
    /// Four or more identical characters in a row
    pub repetition: bool,
    /// Fewer than four distinct characters in a code longer than six
    pub low_diversity: bool,
    /// Long all-digit or all-letter code
    pub uniform: bool,
}

impl AnomalyReport {
    pub fn any(&self) -> bool {
        self.length || self.repetition || self.low_diversity || self.uniform
    }
}

pub fn detect_anomalies(code: &str) -> AnomalyReport {
    let len = normalizer::char_len(code);

    let length = !(MIN_LENGTH..=MAX_LENGTH).contains(&len);
    let repetition = normalizer::longest_run(code) >= 4;
    let low_diversity = len > 6 && normalizer::distinct_chars(code) < 4;
    let uniform = (normalizer::is_all_digits(code) && len > 8)
        || (normalizer::is_all_letters(code) && len > 6);

    let mut card = ScoreCard::new(0.0);
    card.add_if(length, "length", LENGTH_PENALTY)
        .add_if(repetition, "repetition", REPETITION_PENALTY)
        .add_if(low_diversity, "low_diversity", LOW_DIVERSITY_PENALTY)
        .add_if(uniform, "uniform", UNIFORM_PENALTY);

    AnomalyReport {
        score: card.total(),
        length,
        repetition,
        low_diversity,
        uniform,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_code_has_no_anomalies() {
        let report = detect_anomalies("BATCH001");
        assert_eq!(report.score, 0.0);
        assert!(!report.any());
    }

    #[test]
    fn test_length_bounds() {
        assert!(detect_anomalies("A1").length);
        assert!(!detect_anomalies("A1B2").length);
        assert!(!detect_anomalies(&"A1".repeat(12)).length);
        assert!(detect_anomalies(&"A1".repeat(13)).length);
    }

    #[test]
    fn test_repetition_and_diversity() {
        let report = detect_anomalies("AAAA1111");
        assert!(report.repetition);
        assert!(report.low_diversity);
        assert_eq!(report.score, REPETITION_PENALTY + LOW_DIVERSITY_PENALTY);
    }

    #[test]
    fn test_uniform_codes() {
        let report = detect_anomalies("123456789");
        assert!(report.uniform);
        assert_eq!(report.score, UNIFORM_PENALTY);

        assert!(!detect_anomalies("12345678").uniform);
        assert!(detect_anomalies("Paracetamol").uniform);
    }

    #[test]
    fn test_pathological_input() {
        let report = detect_anomalies(&"9".repeat(500));
        assert!(report.length && report.repetition && report.low_diversity && report.uniform);
        assert_eq!(report.score, 60.0);
        assert_eq!(detect_anomalies("").score, LENGTH_PENALTY);
    }
}
