//! Database signal: what the supply record store says about a batch.

use chrono::{DateTime, Utc};
use medguard_core::{ComplianceStatus, FakeStatus, MedicineRecord, SupplierRecord, SupplyRecord};
use medguard_policy::{FlagSet, RiskFlag, ScoreCard};

/// Found in the supply database
pub const FOUND_DELTA: f64 = 35.0;
/// Linked medicine record present
pub const MEDICINE_DELTA: f64 = 10.0;
pub const HIGH_TRUST_DELTA: f64 = 15.0;
pub const GOOD_TRUST_DELTA: f64 = 5.0;
pub const LOW_TRUST_DELTA: f64 = -20.0;
/// Replaces the accumulated delta for an expired supply
pub const EXPIRED_OVERRIDE: f64 = -50.0;
pub const NEAR_EXPIRY_DELTA: f64 = -10.0;
pub const REJECTED_DELTA: f64 = -25.0;
pub const PENDING_DELTA: f64 = -10.0;
/// Replaces the accumulated delta for a suspected fake
pub const SUSPECTED_FAKE_OVERRIDE: f64 = -60.0;
/// Replaces the accumulated delta for a confirmed counterfeit
pub const CONFIRMED_FAKE_OVERRIDE: f64 = -80.0;

const NEAR_EXPIRY_DAYS: i64 = 30;

/// Evidence gathered from the record store for one batch
#[derive(Debug, Clone, Default)]
pub struct DatabaseEvidence {
    /// Whether the store was asked at all
    pub consulted: bool,
    pub supply: Option<SupplyRecord>,
    pub medicine: Option<MedicineRecord>,
    pub supplier: Option<SupplierRecord>,
    pub card: ScoreCard,
    pub flags: FlagSet,
    pub reasoning: Vec<String>,
}

impl DatabaseEvidence {
    /// No lookup was made (no batch number available)
    pub fn absent() -> Self {
        Self::default()
    }

    /// Looked up and not found, or the lookup failed
    pub fn not_found() -> Self {
        let mut flags = FlagSet::new();
        flags.push(RiskFlag::NotInDatabase);
        Self {
            consulted: true,
            flags,
            reasoning: vec!["Batch not found in MedGuard database".to_string()],
            ..Self::default()
        }
    }

    /// Score a supply record and its linked records
    pub fn found(
        supply: SupplyRecord,
        medicine: Option<MedicineRecord>,
        supplier: Option<SupplierRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut card = ScoreCard::new(0.0);
        let mut flags = FlagSet::new();
        let mut reasoning = vec!["Batch found in MedGuard database".to_string()];

        card.add("database_match", FOUND_DELTA);

        if let Some(medicine) = &medicine {
            card.add("registered_medicine", MEDICINE_DELTA);
            reasoning.push(format!("Registered product: {}", medicine.name));
        }

        if let Some(supplier) = &supplier {
            let trust = supplier.trust();
            if trust >= 80.0 {
                card.add("supplier_trust", HIGH_TRUST_DELTA);
                reasoning.push(format!("High-trust supplier: {} ({}% trust)", supplier.name, trust));
            } else if trust >= 60.0 {
                card.add("supplier_trust", GOOD_TRUST_DELTA);
            } else if trust < 40.0 {
                card.add("supplier_trust", LOW_TRUST_DELTA);
                flags.push(RiskFlag::LowTrustSupplier);
                reasoning.push(format!("Low-trust supplier: {} ({}% trust)", supplier.name, trust));
            }
        }

        match supply.days_to_expiry(now) {
            Some(days) if days < 0 => {
                card.set("expired", EXPIRED_OVERRIDE);
                flags.push(RiskFlag::Expired);
            }
            Some(days) if days < NEAR_EXPIRY_DAYS => {
                card.add("near_expiry", NEAR_EXPIRY_DELTA);
                flags.push(RiskFlag::NearExpiry);
            }
            _ => {}
        }

        match supply.compliance_status {
            Some(ComplianceStatus::Rejected) => {
                card.add("compliance_rejected", REJECTED_DELTA);
                flags.push(RiskFlag::ComplianceRejected);
            }
            Some(ComplianceStatus::Pending) => {
                card.add("compliance_pending", PENDING_DELTA);
                flags.push(RiskFlag::CompliancePending);
            }
            Some(ComplianceStatus::Accepted) | None => {}
        }

        match supply.fake_status {
            Some(FakeStatus::Suspected) => {
                card.set("suspected_fake", SUSPECTED_FAKE_OVERRIDE);
                flags.push(RiskFlag::SuspectedFake);
            }
            Some(FakeStatus::Confirmed) => {
                card.set("confirmed_fake", CONFIRMED_FAKE_OVERRIDE);
                flags.push(RiskFlag::ConfirmedCounterfeit);
            }
            None => {}
        }

        flags.extend(supply.typed_flags());

        Self {
            consulted: true,
            supply: Some(supply),
            medicine,
            supplier,
            card,
            flags,
            reasoning,
        }
    }

    pub fn is_found(&self) -> bool {
        self.supply.is_some()
    }

    /// Net delta contributed to the combined signal
    pub fn delta(&self) -> f64 {
        self.card.total()
    }
}
