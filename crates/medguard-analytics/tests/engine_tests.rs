//! Analytics over the shared seed fixture.

use async_trait::async_trait;
use medguard_analytics::{AnalyticsEngine, CorruptionKind, PriorityRecommendation, Zone};
use medguard_core::{
    AlertRecord, MedguardError, MedicineRecord, MemoryStore, RecordStore, Result, SeedData,
    SupplierRecord, SupplyRecord,
};
use medguard_policy::RiskLevel;
use std::sync::Arc;

const SEED: &str = include_str!("../../../testing/fixtures/seed.json");

fn engine() -> AnalyticsEngine {
    let seed = SeedData::from_json(SEED).unwrap();
    AnalyticsEngine::new(Arc::new(MemoryStore::from_seed(seed)))
}

struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn find_supply_by_batch(&self, _batch_number: &str) -> Result<Option<SupplyRecord>> {
        Ok(None)
    }

    async fn find_medicine(&self, _id: &str) -> Result<Option<MedicineRecord>> {
        Ok(None)
    }

    async fn find_supplier(&self, _id: &str) -> Result<Option<SupplierRecord>> {
        Ok(None)
    }

    async fn supplies(&self) -> Result<Vec<SupplyRecord>> {
        Err(MedguardError::Store("supplies unavailable".to_string()))
    }

    async fn suppliers(&self) -> Result<Vec<SupplierRecord>> {
        Ok(Vec::new())
    }

    async fn alerts(&self) -> Result<Vec<AlertRecord>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_corruption_over_seed() {
    let report = engine().detect_corruption_patterns().await.unwrap();

    assert_eq!(report.total_flags, 1);
    let flag = &report.flags[0];
    assert_eq!(flag.kind, CorruptionKind::BlacklistAccepted);
    assert_eq!(flag.supplier_id.as_deref(), Some("sup-shady"));
    assert_eq!(flag.severity, RiskLevel::Critical);

    // sup-006 is soft-deleted and must not count
    assert_eq!(report.summary.total_suppliers, 3);
    assert_eq!(report.summary.total_approvals, 3);
    assert_eq!(report.summary.total_rejections, 1);
}

#[tokio::test]
async fn test_priority_over_seed() {
    let entries = engine().calculate_priority().await.unwrap();
    let order: Vec<&str> = entries.iter().map(|e| e.supply_id.as_str()).collect();
    assert_eq!(order, vec!["sup-004", "sup-002", "sup-003", "sup-001", "sup-005"]);

    let expired = &entries[0];
    assert_eq!(expired.priority_score, 135.0);
    assert_eq!(expired.recommendation, PriorityRecommendation::Expired);
    assert!(expired.days_to_expiry.unwrap() < 0);

    assert_eq!(entries[1].priority_score, 30.0);
    assert_eq!(entries[1].recommendation, PriorityRecommendation::Normal);
    assert_eq!(entries[3].priority_score, 5.0);
    assert_eq!(entries[4].recommendation, PriorityRecommendation::Hold);
}

#[tokio::test]
async fn test_trust_over_seed() {
    let engine = engine();

    let shady = engine.calculate_trust_score("sup-shady").await.unwrap();
    assert_eq!(shady.total_supplies, 2);
    assert_eq!(shady.score, 0.0);
    assert_eq!(shady.risk, RiskLevel::High);

    let goa = engine.calculate_trust_score("sup-goa").await.unwrap();
    assert_eq!(goa.total_supplies, 1);
    assert_eq!(goa.score, 100.0);
    assert_eq!(goa.risk, RiskLevel::Low);

    let unknown = engine.calculate_trust_score("sup-nobody").await.unwrap();
    assert_eq!(unknown.score, 100.0);
    assert_eq!(unknown.risk, RiskLevel::Low);
}

#[tokio::test]
async fn test_risk_map_over_seed() {
    let map = engine().generate_risk_map().await.unwrap();

    assert_eq!(map.total_suppliers, 3);
    assert_eq!((map.high_risk, map.medium_risk, map.low_risk), (1, 0, 2));

    let worst = &map.suppliers[0];
    assert_eq!(worst.supplier_id, "sup-shady");
    // 10 + 5 + 5 + 4 + 2 + 20
    assert_eq!(worst.risk_score, 46.0);
    assert_eq!(worst.zone, Zone::Red);
    assert_eq!(worst.alert_count, 2);

    assert_eq!(map.suppliers[1].supplier_id, "sup-delhi");
    assert_eq!(map.suppliers[1].risk_score, 3.0);
    assert!(map.suppliers.iter().all(|s| s.supplier_id != "sup-remote"));
}

#[tokio::test]
async fn test_store_failure_is_reported() {
    let engine = AnalyticsEngine::new(Arc::new(UnavailableStore));
    assert!(matches!(
        engine.detect_corruption_patterns().await,
        Err(MedguardError::Store(_))
    ));
    assert!(engine.calculate_priority().await.is_err());
    assert!(engine.generate_risk_map().await.is_err());
}

#[tokio::test]
async fn test_report_wire_shape() {
    let map = engine().generate_risk_map().await.unwrap();
    let json = serde_json::to_value(&map).unwrap();
    assert_eq!(json["highRisk"], 1);
    assert_eq!(json["suppliers"][0]["zone"], "RED");
    assert_eq!(json["suppliers"][0]["riskLevel"], "HIGH");
    assert_eq!(json["suppliers"][0]["location"]["lat"], 25.5941);
}
