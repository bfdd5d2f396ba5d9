//! Scan log
//!
//! Flattened record of every verification attempt, plus an in-memory sink
//! with summary statistics.

use crate::context::RequestContext;
use crate::data_model::{InputType, VerificationResult};
use crate::error::Result;
use crate::store::ScanLogSink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medguard_policy::Verdict;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// A scan log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanLogEntry {
    /// Unique entry ID
    pub id: String,

    pub input_type: InputType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicine_name: Option<String>,

    pub verdict: Verdict,

    pub confidence: f64,

    #[serde(default)]
    pub risk_flags: Vec<String>,

    #[serde(default)]
    pub reasoning: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    pub timestamp: DateTime<Utc>,

    /// Whether the batch matched a stored supply
    #[serde(default)]
    pub database_match: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ScanLogEntry {
    /// Flatten a result into a log entry
    pub fn from_result(
        input_type: InputType,
        result: &VerificationResult,
        ctx: &RequestContext,
    ) -> Self {
        Self {
            id: generate_scan_id(),
            input_type,
            batch_number: None,
            manufacturer: None,
            medicine_name: None,
            verdict: result.verdict,
            confidence: result.confidence,
            risk_flags: result.risk_flags.to_strings(),
            reasoning: result.reasoning.clone(),
            device_id: ctx.device_id.clone(),
            ip_address: ctx.ip_address.clone(),
            timestamp: Utc::now(),
            database_match: false,
            supply_id: None,
            trace_id: Some(ctx.trace_id.clone()),
        }
    }

    pub fn with_batch(mut self, batch_number: Option<&str>) -> Self {
        self.batch_number = batch_number.map(str::to_string);
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: Option<&str>) -> Self {
        self.manufacturer = manufacturer.map(str::to_string);
        self
    }

    pub fn with_medicine_name(mut self, medicine_name: Option<&str>) -> Self {
        self.medicine_name = medicine_name.map(str::to_string);
        self
    }

    pub fn with_supply(mut self, supply_id: Option<&str>) -> Self {
        self.database_match = supply_id.is_some();
        self.supply_id = supply_id.map(str::to_string);
        self
    }
}

fn generate_scan_id() -> String {
    format!("scan_{}", uuid::Uuid::new_v4().simple())
}

/// Aggregate statistics over the scan log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    pub total: usize,
    pub by_verdict: BTreeMap<String, usize>,
    pub by_input_type: BTreeMap<String, usize>,
    /// Scans that ended in `HIGH_RISK_FAKE`
    pub high_risk: usize,
    pub database_matches: usize,
    pub average_confidence: f64,
}

impl ScanStats {
    pub fn from_entries(entries: &[ScanLogEntry]) -> Self {
        let mut stats = ScanStats {
            total: entries.len(),
            ..Default::default()
        };

        let mut confidence_sum = 0.0;
        for entry in entries {
            *stats
                .by_verdict
                .entry(entry.verdict.as_str().to_string())
                .or_insert(0) += 1;
            *stats
                .by_input_type
                .entry(entry.input_type.as_str().to_string())
                .or_insert(0) += 1;
            if entry.verdict == Verdict::HighRiskFake {
                stats.high_risk += 1;
            }
            if entry.database_match {
                stats.database_matches += 1;
            }
            confidence_sum += entry.confidence;
        }

        if stats.total > 0 {
            stats.average_confidence =
                medguard_policy::round1(confidence_sum / stats.total as f64);
        }
        stats
    }
}

/// In-memory scan log
#[derive(Debug, Default)]
pub struct MemoryScanLog {
    entries: RwLock<Vec<ScanLogEntry>>,
}

impl MemoryScanLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<ScanLogEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> ScanStats {
        ScanStats::from_entries(&self.entries.read().await)
    }
}

#[async_trait]
impl ScanLogSink for MemoryScanLog {
    async fn append(&self, entry: ScanLogEntry) -> Result<String> {
        let id = entry.id.clone();
        self.entries.write().await.push(entry);
        Ok(id)
    }
}
