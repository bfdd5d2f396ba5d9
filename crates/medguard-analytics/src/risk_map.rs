//! Geographic supplier risk map.

use medguard_core::{AlertRecord, ComplianceStatus, FakeStatus, GeoPoint, SupplierRecord, SupplyRecord};
use medguard_policy::{RiskLevel, ScoreCard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const REJECTION_PENALTY: f64 = 5.0;
pub const CONFIRMED_FAKE_PENALTY: f64 = 10.0;
pub const SUSPECTED_FAKE_PENALTY: f64 = 5.0;
pub const FLAGGED_SUPPLY_PENALTY: f64 = 3.0;
pub const HIGH_ALERT_PENALTY: f64 = 4.0;
pub const ALERT_PENALTY: f64 = 2.0;
pub const BLACKLIST_PENALTY: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    Red,
    Yellow,
    Green,
}

impl From<RiskLevel> for Zone {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::High | RiskLevel::Critical => Zone::Red,
            RiskLevel::Medium => Zone::Yellow,
            RiskLevel::Low => Zone::Green,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMapEntry {
    pub supplier_id: String,
    pub supplier_name: String,
    pub risk_score: f64,
    pub zone: Zone,
    pub risk_level: RiskLevel,
    pub location: GeoPoint,
    pub address: Option<String>,
    pub verified: bool,
    pub blacklisted: bool,
    pub alert_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMap {
    pub total_suppliers: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub suppliers: Vec<RiskMapEntry>,
}

#[derive(Default)]
struct Exposure {
    card: ScoreCard,
    alerts: usize,
}

/// Build the map. Suppliers without coordinates are scored but left out.
pub fn build_risk_map(
    suppliers: &[SupplierRecord],
    supplies: &[SupplyRecord],
    alerts: &[AlertRecord],
) -> RiskMap {
    let mut exposure: HashMap<&str, Exposure> = HashMap::new();

    for supply in supplies {
        let Some(supplier_id) = supply.supplier_id.as_deref() else {
            continue;
        };
        let card = &mut exposure.entry(supplier_id).or_default().card;
        card.add_if(
            supply.compliance_status == Some(ComplianceStatus::Rejected),
            "rejected",
            REJECTION_PENALTY,
        );
        match supply.fake_status {
            Some(FakeStatus::Confirmed) => {
                card.add("confirmed_fake", CONFIRMED_FAKE_PENALTY);
            }
            Some(FakeStatus::Suspected) => {
                card.add("suspected_fake", SUSPECTED_FAKE_PENALTY);
            }
            None => {}
        }
        card.add_if(!supply.risk_flags.is_empty(), "flagged", FLAGGED_SUPPLY_PENALTY);
    }

    // Alerts reach a supplier through the supply they were raised on
    let owner: HashMap<&str, &str> = supplies
        .iter()
        .filter_map(|s| Some((s.id.as_str(), s.supplier_id.as_deref()?)))
        .collect();
    for alert in alerts {
        let Some(supplier_id) = alert.supply_id.as_deref().and_then(|id| owner.get(id).copied()) else {
            continue;
        };
        let entry = exposure.entry(supplier_id).or_default();
        entry.alerts += 1;
        let penalty = if alert.level() == RiskLevel::High {
            HIGH_ALERT_PENALTY
        } else {
            ALERT_PENALTY
        };
        entry.card.add("alert", penalty);
    }

    let thresholds = RiskLevel::exposure_thresholds();
    let mut entries: Vec<RiskMapEntry> = suppliers
        .iter()
        .filter_map(|supplier| {
            // a zero coordinate is an unset one in supplier data
            let location = supplier
                .location()
                .filter(|point| point.lat != 0.0 && point.lng != 0.0)?;
            let (mut card, alert_count) = exposure
                .remove(supplier.id.as_str())
                .map(|e| (e.card, e.alerts))
                .unwrap_or_default();
            card.add_if(supplier.blacklisted, "blacklisted", BLACKLIST_PENALTY);

            let risk_score = card.total();
            let risk_level = thresholds.bucket(risk_score);
            Some(RiskMapEntry {
                supplier_id: supplier.id.clone(),
                supplier_name: supplier.name.clone(),
                risk_score,
                zone: Zone::from(risk_level),
                risk_level,
                location,
                address: supplier.address.clone(),
                verified: supplier.verified,
                blacklisted: supplier.blacklisted,
                alert_count,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));

    let count = |zone: Zone| entries.iter().filter(|e| e.zone == zone).count();
    RiskMap {
        total_suppliers: entries.len(),
        high_risk: count(Zone::Red),
        medium_risk: count(Zone::Yellow),
        low_risk: count(Zone::Green),
        suppliers: entries,
    }
}
