//! MedGuard Verify: the Evidence Aggregator
//!
//! Three entry points share one scoring path:
//!
//! - [`EvidenceAggregator::verify_by_batch`]
//! - [`EvidenceAggregator::verify_by_barcode_image`] decodes, then delegates
//! - [`EvidenceAggregator::verify_by_medicine_name`] resolves the brand, then delegates
//!
//! ```text
//! batch ──► record store ──► database delta ─┐
//!       ──► pattern analyzer ──► confidence ─┼─► merge ─► clamp ─► verdict
//! manufacturer ──► registry ──► delta ───────┘
//! ```
//!
//! Database found or registry matched: 65% authoritative, 35% pattern.
//! Otherwise: 40% authoritative, 60% pattern.

pub mod aggregator;
pub mod barcode;
pub mod database;

pub use aggregator::{EvidenceAggregator, AUTHORITATIVE_WEIGHT, DEFAULT_LOOKUP_TIMEOUT, UNMATCHED_WEIGHT};
pub use barcode::{parse_payload, TextBarcodeDecoder};
pub use database::DatabaseEvidence;
