//! Supplier trust score from historical compliance outcomes.

use medguard_core::{ComplianceStatus, FakeStatus, SupplyRecord};
use medguard_policy::{RiskLevel, ScoreCard};
use serde::{Deserialize, Serialize};

pub const REJECTION_WEIGHT: f64 = 40.0;
pub const WARNING_WEIGHT: f64 = 30.0;
pub const FAKE_WEIGHT: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustScore {
    pub supplier_id: String,
    /// 0-100, whole number
    pub score: f64,
    pub risk: RiskLevel,
    pub total_supplies: usize,
    pub rejected: usize,
    /// Supplies carrying any risk flag
    pub warnings: usize,
    pub confirmed_fakes: usize,
}

/// Score one supplier over its live supplies. Supplies belonging to other
/// suppliers are ignored.
pub fn trust_score(supplier_id: &str, supplies: &[SupplyRecord]) -> TrustScore {
    let own: Vec<&SupplyRecord> = supplies
        .iter()
        .filter(|s| s.supplier_id.as_deref() == Some(supplier_id))
        .collect();

    let total = own.len();
    let rejected = own
        .iter()
        .filter(|s| s.compliance_status == Some(ComplianceStatus::Rejected))
        .count();
    let warnings = own.iter().filter(|s| !s.risk_flags.is_empty()).count();
    let confirmed_fakes = own
        .iter()
        .filter(|s| s.fake_status == Some(FakeStatus::Confirmed))
        .count();

    let mut card = ScoreCard::new(100.0);
    if total > 0 {
        let rate = |count: usize| count as f64 / total as f64;
        card.add("rejections", -rate(rejected) * REJECTION_WEIGHT * 100.0)
            .add("warnings", -rate(warnings) * WARNING_WEIGHT * 100.0)
            .add("fakes", -rate(confirmed_fakes) * FAKE_WEIGHT * 100.0);
    }
    let score = card.floored().floor();

    TrustScore {
        supplier_id: supplier_id.to_string(),
        score,
        risk: RiskLevel::trust_thresholds().bucket(score),
        total_supplies: total,
        rejected,
        warnings,
        confirmed_fakes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply(i: usize) -> SupplyRecord {
        SupplyRecord::new(format!("s{}", i), format!("B{}", i))
            .with_supplier("sup-1")
            .with_compliance(ComplianceStatus::Accepted)
    }

    #[test]
    fn test_no_supplies_is_fully_trusted() {
        let score = trust_score("sup-1", &[]);
        assert_eq!(score.score, 100.0);
        assert_eq!(score.risk, RiskLevel::Low);
        assert_eq!(score.total_supplies, 0);
    }

    #[test]
    fn test_clean_history() {
        let supplies: Vec<_> = (0..5).map(supply).collect();
        let score = trust_score("sup-1", &supplies);
        assert_eq!(score.score, 100.0);
        assert_eq!(score.risk, RiskLevel::Low);
    }

    #[test]
    fn test_rates_are_weighted_and_scaled() {
        let mut supplies: Vec<_> = (0..10).map(supply).collect();
        supplies[0].compliance_status = Some(ComplianceStatus::Rejected);
        supplies[1] = supplies[1].clone().with_flag("TEMPERATURE_BREACH");

        // 100 - (0.1 * 40 + 0.1 * 30) * 100 = -600, floored
        let score = trust_score("sup-1", &supplies);
        assert_eq!(score.score, 0.0);
        assert_eq!(score.risk, RiskLevel::High);
        assert_eq!(score.rejected, 1);
        assert_eq!(score.warnings, 1);
    }

    #[test]
    fn test_only_confirmed_fakes_count() {
        let mut supplies: Vec<_> = (0..4).map(supply).collect();
        supplies[0].fake_status = Some(FakeStatus::Suspected);
        let score = trust_score("sup-1", &supplies);
        assert_eq!(score.confirmed_fakes, 0);
        assert_eq!(score.score, 100.0);
    }

    #[test]
    fn test_other_suppliers_are_ignored() {
        let mut supplies: Vec<_> = (0..3).map(supply).collect();
        supplies.push(
            SupplyRecord::new("x", "X1")
                .with_supplier("sup-2")
                .with_compliance(ComplianceStatus::Rejected),
        );
        let score = trust_score("sup-1", &supplies);
        assert_eq!(score.total_supplies, 3);
        assert_eq!(score.score, 100.0);
    }
}
