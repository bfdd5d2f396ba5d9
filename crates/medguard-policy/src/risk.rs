//! Risk levels shared by the analytics engines

use crate::scoring::Thresholds;
use serde::{Deserialize, Serialize};

/// Severity / risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

impl RiskLevel {
    /// Parse a loosely-typed severity string, defaulting to `Low`
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => RiskLevel::Critical,
            "HIGH" => RiskLevel::High,
            "MEDIUM" => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// Supplier trust buckets: above 75 is low risk, above 40 medium
    pub fn trust_thresholds() -> Thresholds<RiskLevel> {
        Thresholds::above(
            vec![(75.0, RiskLevel::Low), (40.0, RiskLevel::Medium)],
            RiskLevel::High,
        )
    }

    /// Risk-map buckets: above 40 is high risk, above 20 medium
    pub fn exposure_thresholds() -> Thresholds<RiskLevel> {
        Thresholds::above(
            vec![(40.0, RiskLevel::High), (20.0, RiskLevel::Medium)],
            RiskLevel::Low,
        )
    }

    /// Check if this level needs human follow-up
    pub fn requires_review(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
