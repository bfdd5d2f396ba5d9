//! MedGuard Policy: verdicts, risk flags and the shared scoring contract
//!
//! Every scoring engine in MedGuard accumulates deltas from independent
//! checks, clamps the total and maps it to an ordered bucket:
//!
//! ```text
//! checks → ScoreCard (add / override) → clamp → Thresholds → bucket
//!                                                    ↓
//!                          Verdict / RiskLevel / priority / zone
//! ```
//!
//! # Example
//!
//! ```
//! use medguard_policy::{FlagSet, RiskFlag, ScoreCard, Verdict};
//!
//! let mut card = ScoreCard::new(0.0);
//! card.add("found_in_database", 35.0)
//!     .add("registry_approved", 35.0)
//!     .add("high_trust_supplier", 15.0);
//!
//! let flags = FlagSet::new();
//! assert_eq!(Verdict::decide(card.confidence(), &flags), Verdict::Safe);
//!
//! let mut flags = FlagSet::new();
//! flags.push(RiskFlag::ConfirmedCounterfeit);
//! assert_eq!(Verdict::decide(card.confidence(), &flags), Verdict::HighRiskFake);
//! ```

pub mod flags;
pub mod recommendation;
pub mod risk;
pub mod scoring;
pub mod verdict;

pub use flags::{FlagSet, RiskFlag};
pub use recommendation::recommend;
pub use risk::RiskLevel;
pub use scoring::{clamp_confidence, round1, Contribution, ContributionKind, ScoreCard, Thresholds};
pub use verdict::Verdict;
