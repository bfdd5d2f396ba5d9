//! Weighted-signal scoring
//!
//! Every engine in MedGuard follows the same shape: independent checks
//! contribute deltas, the total is clamped, and the scalar is mapped to a
//! small ordered set of buckets. `ScoreCard` records the deltas (with their
//! names, for traceability) and `Thresholds` does the bucketing.

use serde::{Deserialize, Serialize};

/// Lower bound of the confidence scale
pub const CONFIDENCE_MIN: f64 = 0.0;
/// Upper bound of the confidence scale
pub const CONFIDENCE_MAX: f64 = 100.0;

/// Clamp a confidence value to [0, 100]. Non-finite values collapse to a bound.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return CONFIDENCE_MIN;
    }
    value.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// How a contribution affects the running total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    /// Added to the running total
    Add,
    /// Replaces the running total; later additions still apply
    Override,
}

/// A single named contribution to a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Name of the signal that produced the delta
    pub signal: String,
    /// The delta (or the override value)
    pub value: f64,
    pub kind: ContributionKind,
}

/// Ordered accumulator of score contributions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    base: f64,
    contributions: Vec<Contribution>,
}

impl ScoreCard {
    /// Create a card starting from `base`
    pub fn new(base: f64) -> Self {
        Self {
            base,
            contributions: Vec::new(),
        }
    }

    /// Add a delta
    pub fn add(&mut self, signal: impl Into<String>, delta: f64) -> &mut Self {
        self.contributions.push(Contribution {
            signal: signal.into(),
            value: delta,
            kind: ContributionKind::Add,
        });
        self
    }

    /// Add a delta only when `condition` holds
    pub fn add_if(&mut self, condition: bool, signal: impl Into<String>, delta: f64) -> &mut Self {
        if condition {
            self.add(signal, delta);
        }
        self
    }

    /// Replace everything accumulated so far with `value`
    pub fn set(&mut self, signal: impl Into<String>, value: f64) -> &mut Self {
        self.contributions.push(Contribution {
            signal: signal.into(),
            value,
            kind: ContributionKind::Override,
        });
        self
    }

    /// Starting value
    pub fn base(&self) -> f64 {
        self.base
    }

    /// Contributions in the order they were recorded
    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Whether an override was recorded
    pub fn was_overridden(&self) -> bool {
        self.contributions
            .iter()
            .any(|c| c.kind == ContributionKind::Override)
    }

    /// Unclamped total
    pub fn total(&self) -> f64 {
        self.contributions
            .iter()
            .fold(self.base, |total, c| match c.kind {
                ContributionKind::Add => total + c.value,
                ContributionKind::Override => c.value,
            })
    }

    /// Total clamped to [lo, hi]
    pub fn clamped(&self, lo: f64, hi: f64) -> f64 {
        let total = self.total();
        if total.is_nan() {
            return lo;
        }
        total.clamp(lo, hi)
    }

    /// Total clamped to the confidence scale
    pub fn confidence(&self) -> f64 {
        clamp_confidence(self.total())
    }

    /// Total floored at zero
    pub fn floored(&self) -> f64 {
        let total = self.total();
        if total.is_nan() || total < 0.0 {
            0.0
        } else {
            total
        }
    }
}

/// Maps a scalar to a bucket through descending thresholds
#[derive(Debug, Clone)]
pub struct Thresholds<B> {
    steps: Vec<(f64, B)>,
    fallback: B,
    inclusive: bool,
}

impl<B: Copy> Thresholds<B> {
    /// Buckets where `score >= threshold` selects the bucket
    pub fn at_least(steps: Vec<(f64, B)>, fallback: B) -> Self {
        Self::build(steps, fallback, true)
    }

    /// Buckets where `score > threshold` selects the bucket
    pub fn above(steps: Vec<(f64, B)>, fallback: B) -> Self {
        Self::build(steps, fallback, false)
    }

    fn build(mut steps: Vec<(f64, B)>, fallback: B, inclusive: bool) -> Self {
        steps.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self {
            steps,
            fallback,
            inclusive,
        }
    }

    /// First bucket whose threshold the score clears, else the fallback
    pub fn bucket(&self, score: f64) -> B {
        for &(threshold, bucket) in &self.steps {
            let clears = if self.inclusive {
                score >= threshold
            } else {
                score > threshold
            };
            if clears {
                return bucket;
            }
        }
        self.fallback
    }
}
