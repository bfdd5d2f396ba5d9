//! Verdict types for batch verification
//!
//! Maps a clamped confidence score to one of five ordered verdicts, with a
//! hard override to the worst verdict when a critical risk flag is present.

use crate::flags::FlagSet;
use crate::scoring::{clamp_confidence, Thresholds};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final categorical verdict for a medicine batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Confidence >= 80
    Safe,
    /// Confidence >= 60
    LikelyAuthentic,
    /// Confidence >= 40, or the batch could not be evaluated
    Unknown,
    /// Confidence >= 20
    Suspicious,
    /// Confidence < 20, or a critical flag was raised
    HighRiskFake,
}

impl Verdict {
    /// All verdicts, best first
    pub const ALL: [Verdict; 5] = [
        Verdict::Safe,
        Verdict::LikelyAuthentic,
        Verdict::Unknown,
        Verdict::Suspicious,
        Verdict::HighRiskFake,
    ];

    /// Confidence thresholds, inclusive lower bounds
    pub fn thresholds() -> Thresholds<Verdict> {
        Thresholds::at_least(
            vec![
                (80.0, Verdict::Safe),
                (60.0, Verdict::LikelyAuthentic),
                (40.0, Verdict::Unknown),
                (20.0, Verdict::Suspicious),
            ],
            Verdict::HighRiskFake,
        )
    }

    /// Map a confidence score to a verdict. The score is clamped first.
    pub fn from_confidence(confidence: f64) -> Self {
        Self::thresholds().bucket(clamp_confidence(confidence))
    }

    /// Decide the verdict from confidence and the collected flags.
    ///
    /// Critical flags are checked before the numeric mapping.
    pub fn decide(confidence: f64, flags: &FlagSet) -> Self {
        if flags.has_critical() {
            return Verdict::HighRiskFake;
        }
        Self::from_confidence(confidence)
    }

    /// Ordinal rank, 0 for the worst verdict and 4 for the best
    pub fn rank(&self) -> u8 {
        match self {
            Verdict::HighRiskFake => 0,
            Verdict::Suspicious => 1,
            Verdict::Unknown => 2,
            Verdict::LikelyAuthentic => 3,
            Verdict::Safe => 4,
        }
    }

    /// Whether the batch should not be used
    pub fn is_negative(&self) -> bool {
        matches!(self, Verdict::Suspicious | Verdict::HighRiskFake)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "SAFE",
            Verdict::LikelyAuthentic => "LIKELY_AUTHENTIC",
            Verdict::Unknown => "UNKNOWN",
            Verdict::Suspicious => "SUSPICIOUS",
            Verdict::HighRiskFake => "HIGH_RISK_FAKE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::RiskFlag;

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_confidence(100.0), Verdict::Safe);
        assert_eq!(Verdict::from_confidence(80.0), Verdict::Safe);
        assert_eq!(Verdict::from_confidence(79.9), Verdict::LikelyAuthentic);
        assert_eq!(Verdict::from_confidence(60.0), Verdict::LikelyAuthentic);
        assert_eq!(Verdict::from_confidence(40.0), Verdict::Unknown);
        assert_eq!(Verdict::from_confidence(20.0), Verdict::Suspicious);
        assert_eq!(Verdict::from_confidence(19.9), Verdict::HighRiskFake);
        assert_eq!(Verdict::from_confidence(0.0), Verdict::HighRiskFake);
    }

    #[test]
    fn test_out_of_range_confidence_is_clamped() {
        assert_eq!(Verdict::from_confidence(250.0), Verdict::Safe);
        assert_eq!(Verdict::from_confidence(-40.0), Verdict::HighRiskFake);
        assert_eq!(Verdict::from_confidence(f64::NAN), Verdict::HighRiskFake);
    }

    #[test]
    fn test_monotonic_in_confidence() {
        let mut previous = Verdict::from_confidence(0.0).rank();
        for step in 0..=1000 {
            let rank = Verdict::from_confidence(step as f64 / 10.0).rank();
            assert!(rank >= previous, "rank dropped at {}", step);
            previous = rank;
        }
    }

    #[test]
    fn test_critical_flag_overrides_confidence() {
        let mut flags = FlagSet::new();
        flags.push(RiskFlag::ConfirmedCounterfeit);
        assert_eq!(Verdict::decide(99.0, &flags), Verdict::HighRiskFake);

        let mut flags = FlagSet::new();
        flags.push(RiskFlag::NearExpiry);
        assert_eq!(Verdict::decide(99.0, &flags), Verdict::Safe);
    }

    #[test]
    fn test_verdict_serialization() {
        let json = serde_json::to_string(&Verdict::LikelyAuthentic).unwrap();
        assert_eq!(json, "\"LIKELY_AUTHENTIC\"");
        let parsed: Verdict = serde_json::from_str("\"HIGH_RISK_FAKE\"").unwrap();
        assert_eq!(parsed, Verdict::HighRiskFake);
        assert_eq!(format!("{}", Verdict::Safe), "SAFE");
    }
}
