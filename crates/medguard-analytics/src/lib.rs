//! MedGuard Analytics: batch scans over the record store
//!
//! Four engines share the same shape: accumulate deltas from independent
//! checks on a [`ScoreCard`](medguard_policy::ScoreCard), then bucket the
//! total through fixed [`Thresholds`](medguard_policy::Thresholds).
//!
//! - [`detect_corruption`]: favoritism, repeated batches, targeted rejection,
//!   approval bias, blacklisted suppliers still being accepted
//! - [`prioritize`]: triage order for stock on hand
//! - [`trust_score`]: supplier reliability from compliance history
//! - [`build_risk_map`]: geographic supplier exposure
//!
//! The scoring functions are pure; [`AnalyticsEngine`] feeds them from a
//! [`RecordStore`](medguard_core::RecordStore).
//!
//! # Example
//!
//! ```
//! use medguard_analytics::trust_score;
//! use medguard_core::{ComplianceStatus, SupplyRecord};
//! use medguard_policy::RiskLevel;
//!
//! let supplies = vec![SupplyRecord::new("s-1", "CPL-123456")
//!     .with_supplier("sup-1")
//!     .with_compliance(ComplianceStatus::Accepted)];
//! let score = trust_score("sup-1", &supplies);
//! assert_eq!(score.score, 100.0);
//! assert_eq!(score.risk, RiskLevel::Low);
//! ```

pub mod corruption;
pub mod engine;
pub mod priority;
pub mod risk_map;
pub mod trust;

pub use corruption::{detect_corruption, CorruptionFlag, CorruptionKind, CorruptionReport, CorruptionSummary};
pub use engine::AnalyticsEngine;
pub use priority::{prioritize, score_supply, PriorityEntry, PriorityRecommendation};
pub use risk_map::{build_risk_map, RiskMap, RiskMapEntry, Zone};
pub use trust::{trust_score, TrustScore};
