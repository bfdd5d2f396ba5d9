//! Priority / triage scoring for stock on hand.

use chrono::{DateTime, Utc};
use medguard_core::{ComplianceStatus, FakeStatus, SupplyRecord};
use medguard_policy::{ScoreCard, Thresholds};
use serde::{Deserialize, Serialize};

pub const EXPIRED_SCORE: f64 = 100.0;
pub const EXPIRY_WEEK_BONUS: f64 = 50.0;
pub const EXPIRY_MONTH_BONUS: f64 = 30.0;
pub const EXPIRY_TWO_MONTH_BONUS: f64 = 15.0;
pub const TEMPERATURE_BONUS: f64 = 20.0;
pub const UNVERIFIED_BONUS: f64 = 15.0;
pub const REJECTED_BONUS: f64 = 25.0;
pub const PENDING_BONUS: f64 = 10.0;
pub const FAKE_BONUS: f64 = 10.0;
pub const LARGE_QUANTITY_BONUS: f64 = 5.0;
pub const LARGE_QUANTITY: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityRecommendation {
    UseImmediately,
    UseSoon,
    Normal,
    Hold,
    Expired,
}

impl PriorityRecommendation {
    /// Score buckets; `Expired` is assigned from the expiry date, not the score
    pub fn thresholds() -> Thresholds<PriorityRecommendation> {
        Thresholds::at_least(
            vec![
                (70.0, PriorityRecommendation::UseImmediately),
                (40.0, PriorityRecommendation::UseSoon),
                (20.0, PriorityRecommendation::Normal),
            ],
            PriorityRecommendation::Hold,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityEntry {
    pub supply_id: String,
    pub batch_number: String,
    pub medicine_id: Option<String>,
    pub quantity: u64,
    pub priority_score: f64,
    pub recommendation: PriorityRecommendation,
    /// Whole days until expiry, negative once expired
    pub days_to_expiry: Option<i64>,
    pub risk_flags: Vec<String>,
    pub compliance_status: Option<ComplianceStatus>,
    pub fake_status: Option<FakeStatus>,
}

/// Score one supply at `now`
pub fn score_supply(supply: &SupplyRecord, now: DateTime<Utc>) -> PriorityEntry {
    let mut card = ScoreCard::new(0.0);
    let days = supply.days_to_expiry(now);

    match days {
        Some(d) if d < 0 => {
            card.set("expired", EXPIRED_SCORE);
        }
        Some(d) if d < 7 => {
            card.add("expiry_week", EXPIRY_WEEK_BONUS);
        }
        Some(d) if d < 30 => {
            card.add("expiry_month", EXPIRY_MONTH_BONUS);
        }
        Some(d) if d < 60 => {
            card.add("expiry_two_months", EXPIRY_TWO_MONTH_BONUS);
        }
        _ => {}
    }

    let flags: Vec<_> = supply.typed_flags().collect();
    card.add_if(
        flags.iter().any(|f| f.mentions("TEMPERATURE")),
        "temperature",
        TEMPERATURE_BONUS,
    )
    .add_if(
        flags.iter().any(|f| f.mentions("UNVERIFIED") || f.mentions("VERIFY")),
        "unverified",
        UNVERIFIED_BONUS,
    );

    match supply.compliance_status {
        Some(ComplianceStatus::Rejected) => {
            card.add("rejected", REJECTED_BONUS);
        }
        Some(ComplianceStatus::Pending) => {
            card.add("pending", PENDING_BONUS);
        }
        Some(ComplianceStatus::Accepted) | None => {}
    }

    card.add_if(supply.fake_status.is_some(), "fake_suspicion", FAKE_BONUS)
        .add_if(supply.quantity > LARGE_QUANTITY, "large_quantity", LARGE_QUANTITY_BONUS);

    let score = card.total();
    let recommendation = match days {
        Some(d) if d < 0 => PriorityRecommendation::Expired,
        _ => PriorityRecommendation::thresholds().bucket(score),
    };

    PriorityEntry {
        supply_id: supply.id.clone(),
        batch_number: supply.batch_number.clone(),
        medicine_id: supply.medicine_id.clone(),
        quantity: supply.quantity,
        priority_score: score,
        recommendation,
        days_to_expiry: days,
        risk_flags: supply.risk_flags.clone(),
        compliance_status: supply.compliance_status,
        fake_status: supply.fake_status,
    }
}

/// Score every supply, highest priority first. Ties keep input order.
pub fn prioritize(supplies: &[SupplyRecord], now: DateTime<Utc>) -> Vec<PriorityEntry> {
    let mut entries: Vec<PriorityEntry> = supplies.iter().map(|s| score_supply(s, now)).collect();
    entries.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    entries
}
