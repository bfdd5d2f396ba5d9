//! Store-backed entry points for the analytics engines.
//!
//! Each call takes a fresh full scan of the collections it needs. Scans run
//! concurrently; writes landing mid-scan may or may not be seen.

use crate::corruption::{detect_corruption, CorruptionReport};
use crate::priority::{prioritize, PriorityEntry};
use crate::risk_map::{build_risk_map, RiskMap};
use crate::trust::{trust_score, TrustScore};
use chrono::Utc;
use medguard_core::{RecordStore, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct AnalyticsEngine {
    store: Arc<dyn RecordStore>,
}

impl AnalyticsEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn detect_corruption_patterns(&self) -> Result<CorruptionReport> {
        let (supplies, suppliers) =
            futures::try_join!(self.store.supplies(), self.store.suppliers())?;
        let report = detect_corruption(&supplies, &suppliers);
        tracing::info!(
            supplies = supplies.len(),
            flags = report.total_flags,
            "corruption scan complete"
        );
        Ok(report)
    }

    pub async fn calculate_priority(&self) -> Result<Vec<PriorityEntry>> {
        let supplies = self.store.supplies().await?;
        let entries = prioritize(&supplies, Utc::now());
        tracing::info!(supplies = entries.len(), "priority scoring complete");
        Ok(entries)
    }

    pub async fn calculate_trust_score(&self, supplier_id: &str) -> Result<TrustScore> {
        let supplies = self.store.supplies().await?;
        let score = trust_score(supplier_id, &supplies);
        tracing::debug!(
            supplier = supplier_id,
            score = score.score,
            risk = %score.risk,
            "trust score"
        );
        Ok(score)
    }

    pub async fn generate_risk_map(&self) -> Result<RiskMap> {
        let (suppliers, supplies, alerts) = futures::try_join!(
            self.store.suppliers(),
            self.store.supplies(),
            self.store.alerts()
        )?;
        let map = build_risk_map(&suppliers, &supplies, &alerts);
        tracing::info!(
            mapped = map.total_suppliers,
            red = map.high_risk,
            "risk map built"
        );
        Ok(map)
    }
}
