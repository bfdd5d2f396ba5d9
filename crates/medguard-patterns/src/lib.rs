//! MedGuard Patterns: batch-code heuristics
//!
//! Produces a self-contained confidence signal for a batch code without any
//! database access, so it works for codes never seen before.
//!
//! ```text
//! batch code ─┬─ format ────────┐
//!             ├─ structure ─────┤
//!             ├─ fake rules ────┼─► confidence + flags + reasoning
//!             ├─ anomalies ─────┤
//!             └─ prefix trust ──┘
//! ```
//!
//! # Example
//!
//! ```
//! use medguard_patterns::PatternAnalyzer;
//!
//! let analyzer = PatternAnalyzer::default();
//! let analysis = analyzer.analyze("BATCH001", None);
//! assert_eq!(analysis.confidence, 76.0);
//! assert!(!analysis.flags.has_critical());
//! ```

pub mod anomaly;
pub mod fakes;
pub mod formats;
pub mod normalizer;
pub mod trust;

use medguard_policy::{round1, FlagSet, RiskFlag, ScoreCard};
use medguard_registry::PrefixTable;
use serde::Serialize;

pub use anomaly::{detect_anomalies, AnomalyReport};
pub use fakes::{fake_similarity, FakeSimilarity, SimilarityRisk};
pub use formats::{analyze_format, matching_format, structure_score, FormatAnalysis};
pub use trust::{infer_trust, TrustInference, NEUTRAL_TRUST};

/// Neutral starting point of the aggregation
pub const BASELINE: f64 = 50.0;

const FORMAT_WEIGHT: f64 = 0.6;
const STRUCTURE_WEIGHT: f64 = 0.5;
const FAKE_WEIGHT: f64 = 0.8;
const ANOMALY_WEIGHT: f64 = 0.6;
const TRUST_WEIGHT: f64 = 0.4;

/// Full result of analysing one batch code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    /// The code as analysed (trimmed)
    pub batch_number: String,
    pub format: FormatAnalysis,
    pub structure_score: f64,
    pub fake_similarity: FakeSimilarity,
    pub anomalies: AnomalyReport,
    pub trust: TrustInference,
    /// Standalone confidence, 0-100, one decimal
    pub confidence: f64,
    pub flags: FlagSet,
    pub reasoning: Vec<String>,
}

impl PatternAnalysis {
    /// Manufacturer inferred from the batch prefix
    pub fn inferred_manufacturer(&self) -> Option<&str> {
        self.format.inferred_manufacturer.as_deref()
    }
}

/// Pattern Analyzer over an injected prefix table
#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer {
    prefixes: PrefixTable,
}

impl PatternAnalyzer {
    pub fn new(prefixes: PrefixTable) -> Self {
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Analyse a batch code, optionally against a supplied manufacturer name.
    /// Deterministic: the same input always yields the same analysis.
    pub fn analyze(&self, batch_code: &str, manufacturer: Option<&str>) -> PatternAnalysis {
        let code = normalizer::normalize(batch_code);
        let prefix = self.prefixes.infer(code);

        let format = analyze_format(code, prefix.as_ref());
        let structure = structure_score(code, &self.prefixes);
        let fakes = fake_similarity(code);
        let anomalies = detect_anomalies(code);
        let trust = infer_trust(code, prefix.as_ref(), manufacturer);

        let mut card = ScoreCard::new(BASELINE);
        card.add("format", (format.score - BASELINE) * FORMAT_WEIGHT)
            .add("structure", (structure - BASELINE) * STRUCTURE_WEIGHT)
            .add("fake_similarity", -fakes.score * FAKE_WEIGHT)
            .add("anomalies", -anomalies.score * ANOMALY_WEIGHT)
            .add("trust", (trust.score - NEUTRAL_TRUST) * TRUST_WEIGHT);
        let confidence = round1(card.confidence());

        tracing::debug!(
            batch = code,
            format = format.score,
            structure,
            fake = fakes.score,
            anomaly = anomalies.score,
            trust = trust.score,
            confidence,
            "pattern analysis"
        );

        let flags = collect_flags(&format, &fakes, &anomalies);
        let reasoning = explain(&format, &fakes, &anomalies, &trust);

        PatternAnalysis {
            batch_number: code.to_string(),
            format,
            structure_score: structure,
            fake_similarity: fakes,
            anomalies,
            trust,
            confidence,
            flags,
            reasoning,
        }
    }
}

fn collect_flags(format: &FormatAnalysis, fakes: &FakeSimilarity, anomalies: &AnomalyReport) -> FlagSet {
    let mut flags = FlagSet::new();
    if fakes.matches_known_pattern() {
        flags.push(RiskFlag::MatchesFakePattern);
    }
    if fakes.risk == SimilarityRisk::High {
        flags.push(RiskFlag::HighFakeSimilarity);
    }
    if anomalies.repetition {
        flags.push(RiskFlag::RepetitionAnomaly);
    }
    if anomalies.length {
        flags.push(RiskFlag::LengthAnomaly);
    }
    if !format.valid {
        flags.push(RiskFlag::InvalidFormat);
    }
    flags
}

/// Fixed checklist; each check contributes at most one line
fn explain(
    format: &FormatAnalysis,
    fakes: &FakeSimilarity,
    anomalies: &AnomalyReport,
    trust: &TrustInference,
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(if format.valid {
        "Batch number follows a recognized pharmaceutical format".to_string()
    } else {
        "Batch number does not match standard pharmaceutical formats".to_string()
    });

    lines.push(match (&format.prefix, &format.inferred_manufacturer) {
        (Some(prefix), Some(name)) => format!("Recognized manufacturer prefix {} ({})", prefix, name),
        _ => "Manufacturer prefix not recognized".to_string(),
    });

    if fakes.matches_known_pattern() {
        lines.push("Matches known fake batch patterns".to_string());
    }
    if fakes.risk == SimilarityRisk::High {
        lines.push("High similarity to known counterfeit batch numbers".to_string());
    }
    if anomalies.repetition {
        lines.push("Unusual repeated character sequence".to_string());
    }
    if anomalies.length {
        lines.push("Unusual batch number length".to_string());
    }
    match trust.manufacturer_verified {
        Some(true) => lines.push("Supplied manufacturer matches batch prefix".to_string()),
        Some(false) => lines.push("Supplied manufacturer does not match batch prefix".to_string()),
        None => {}
    }
    if trust.score >= 80.0 {
        lines.push("High-trust manufacturer inferred".to_string());
    } else if trust.score < 40.0 {
        lines.push("Low-trust signals detected".to_string());
    }

    lines
}
