//! Corruption pattern detection
//!
//! Tallies approvals and rejections per supplier and repeats per batch code
//! over all live supplies, then applies fixed threshold checks. Each check
//! that fires produces one [`CorruptionFlag`].

use medguard_core::{ComplianceStatus, SupplierRecord, SupplyRecord};
use medguard_policy::{round1, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Approvals above which a supplier can be flagged for favoritism
pub const FAVORITISM_MIN_APPROVALS: usize = 20;
/// Multiple of the mean approval count that counts as favoritism
pub const FAVORITISM_FACTOR: f64 = 2.0;
/// Occurrences of one batch code above which it is flagged
pub const REPEATED_BATCH_LIMIT: usize = 5;
pub const TARGETED_REJECTION_LIMIT: usize = 15;
/// Minimum decided supplies for the rate-based checks
pub const MIN_DECIDED_SUPPLIES: usize = 10;
/// Rejection rate (percent) above which a supplier looks targeted
pub const TARGETED_REJECTION_RATE: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorruptionKind {
    #[serde(rename = "BLACKLIST_ACCEPTED")]
    BlacklistAccepted,
    #[serde(rename = "FAVORITISM_DETECTED")]
    Favoritism,
    #[serde(rename = "REPEATED_BATCH_APPROVAL")]
    RepeatedBatchApproval,
    #[serde(rename = "TARGETED_REJECTION")]
    TargetedRejection,
    #[serde(rename = "BIAS_APPROVAL_PATTERN")]
    BiasApproval,
}

impl CorruptionKind {
    pub fn severity(&self) -> RiskLevel {
        match self {
            CorruptionKind::BlacklistAccepted => RiskLevel::Critical,
            CorruptionKind::Favoritism => RiskLevel::High,
            CorruptionKind::RepeatedBatchApproval
            | CorruptionKind::TargetedRejection
            | CorruptionKind::BiasApproval => RiskLevel::Medium,
        }
    }
}

/// One detected pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorruptionFlag {
    #[serde(rename = "type")]
    pub kind: CorruptionKind,
    pub severity: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    pub count: usize,
    /// Percent, one decimal; targeted rejection only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_rate: Option<f64>,
    pub detail: String,
}

impl CorruptionFlag {
    fn for_supplier(kind: CorruptionKind, supplier: &SupplierTally, count: usize, detail: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            supplier_id: Some(supplier.id.clone()),
            supplier_name: Some(supplier.name.clone()),
            batch: None,
            count,
            rejection_rate: None,
            detail,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorruptionSummary {
    pub total_suppliers: usize,
    pub total_approvals: usize,
    pub total_rejections: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorruptionReport {
    pub total_flags: usize,
    pub flags: Vec<CorruptionFlag>,
    pub summary: CorruptionSummary,
}

#[derive(Debug, Default)]
struct SupplierTally {
    id: String,
    name: String,
    blacklisted: bool,
    approvals: usize,
    rejections: usize,
}

impl SupplierTally {
    fn decided(&self) -> usize {
        self.approvals + self.rejections
    }

    /// Percent of decided supplies that were rejected
    fn rejection_rate(&self) -> f64 {
        match self.decided() {
            0 => 0.0,
            total => self.rejections as f64 / total as f64 * 100.0,
        }
    }
}

/// Run every corruption check over live supplies and suppliers
pub fn detect_corruption(supplies: &[SupplyRecord], suppliers: &[SupplierRecord]) -> CorruptionReport {
    let known: HashMap<&str, &SupplierRecord> =
        suppliers.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut tallies: BTreeMap<&str, SupplierTally> = BTreeMap::new();
    let mut batches: BTreeMap<&str, usize> = BTreeMap::new();

    for supply in supplies {
        if !supply.batch_number.is_empty() {
            *batches.entry(supply.batch_number.as_str()).or_default() += 1;
        }

        let Some(supplier_id) = supply.supplier_id.as_deref() else {
            continue;
        };
        let tally = tallies.entry(supplier_id).or_insert_with(|| {
            let record = known.get(supplier_id);
            SupplierTally {
                id: supplier_id.to_string(),
                name: record.map_or_else(|| "Unknown".to_string(), |s| s.name.clone()),
                blacklisted: record.is_some_and(|s| s.blacklisted),
                ..SupplierTally::default()
            }
        });
        match supply.compliance_status {
            Some(ComplianceStatus::Accepted) => tally.approvals += 1,
            Some(ComplianceStatus::Rejected) => tally.rejections += 1,
            Some(ComplianceStatus::Pending) | None => {}
        }
    }

    let mut flags = Vec::new();

    for tally in tallies.values() {
        if tally.blacklisted && tally.approvals > 0 {
            flags.push(CorruptionFlag::for_supplier(
                CorruptionKind::BlacklistAccepted,
                tally,
                tally.approvals,
                format!(
                    "Blacklisted supplier has {} accepted supplies",
                    tally.approvals
                ),
            ));
        }
    }

    let approving: Vec<&SupplierTally> = tallies.values().filter(|t| t.approvals > 0).collect();
    if !approving.is_empty() {
        let mean = approving.iter().map(|t| t.approvals).sum::<usize>() as f64 / approving.len() as f64;
        for tally in &approving {
            if tally.approvals > FAVORITISM_MIN_APPROVALS
                && tally.approvals as f64 > mean * FAVORITISM_FACTOR
            {
                flags.push(CorruptionFlag::for_supplier(
                    CorruptionKind::Favoritism,
                    tally,
                    tally.approvals,
                    format!(
                        "Supplier has {} approvals (avg: {})",
                        tally.approvals,
                        mean.trunc()
                    ),
                ));
            }
        }
    }

    for (&batch, &count) in &batches {
        if count > REPEATED_BATCH_LIMIT {
            let kind = CorruptionKind::RepeatedBatchApproval;
            flags.push(CorruptionFlag {
                kind,
                severity: kind.severity(),
                supplier_id: None,
                supplier_name: None,
                batch: Some(batch.to_string()),
                count,
                rejection_rate: None,
                detail: format!("Batch {} recorded {} times", batch, count),
            });
        }
    }

    for tally in tallies.values().filter(|t| t.rejections > 0) {
        let rate = tally.rejection_rate();
        if tally.rejections > TARGETED_REJECTION_LIMIT
            || (tally.decided() > MIN_DECIDED_SUPPLIES && rate > TARGETED_REJECTION_RATE)
        {
            let mut flag = CorruptionFlag::for_supplier(
                CorruptionKind::TargetedRejection,
                tally,
                tally.rejections,
                format!(
                    "Supplier has {} rejections ({:.1}% rate)",
                    tally.rejections, rate
                ),
            );
            flag.rejection_rate = Some(round1(rate));
            flags.push(flag);
        }
    }

    for tally in &approving {
        if tally.decided() > MIN_DECIDED_SUPPLIES && tally.rejections == 0 {
            flags.push(CorruptionFlag::for_supplier(
                CorruptionKind::BiasApproval,
                tally,
                tally.approvals,
                format!("100% approval rate over {} supplies", tally.decided()),
            ));
        }
    }

    let involved: BTreeSet<&str> = tallies
        .iter()
        .filter(|(_, t)| t.decided() > 0)
        .map(|(id, _)| *id)
        .collect();
    let summary = CorruptionSummary {
        total_suppliers: involved.len(),
        total_approvals: tallies.values().map(|t| t.approvals).sum(),
        total_rejections: tallies.values().map(|t| t.rejections).sum(),
    };

    CorruptionReport {
        total_flags: flags.len(),
        flags,
        summary,
    }
}
