//! Manufacturer authority registry
//!
//! Classifies a manufacturer name against a static registry and translates
//! the outcome into a confidence delta and an optional warning flag.

use medguard_core::{MedguardError, Result};
use medguard_policy::RiskFlag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Delta for an approved manufacturer. This is the single strongest positive
/// signal in the verification pipeline.
pub const APPROVED_DELTA: f64 = 35.0;
/// Delta for a manufacturer under provisional review
pub const PROVISIONAL_DELTA: f64 = 10.0;
/// Delta for a manufacturer missing from (or unapproved in) the registry
pub const UNLISTED_DELTA: f64 = -30.0;

const BUILTIN_REGISTRY: &str = include_str!("../data/manufacturers.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryStatus {
    Approved,
    Provisional,
    #[serde(other)]
    Unlisted,
}

impl RegistryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryStatus::Approved => "Approved",
            RegistryStatus::Provisional => "Provisional",
            RegistryStatus::Unlisted => "Unlisted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerEntry {
    #[serde(rename = "manufacturer_name")]
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub state: String,
    pub category: String,
    pub status: RegistryStatus,
}

/// Outcome of a registry lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryCheck {
    /// Manufacturer name as supplied, trimmed
    pub query: Option<String>,
    /// Matched entry, if any
    pub entry: Option<ManufacturerEntry>,
    pub delta: f64,
    pub flag: Option<RiskFlag>,
}

impl RegistryCheck {
    /// Whether the name matched a registry entry
    pub fn matched(&self) -> bool {
        self.entry.is_some()
    }

    /// Whether a manufacturer name was supplied at all
    pub fn was_consulted(&self) -> bool {
        self.query.is_some()
    }

    /// One line of reasoning, or nothing when no name was supplied
    pub fn reasoning(&self) -> Option<String> {
        match (&self.query, &self.entry) {
            (None, _) => None,
            (Some(_), Some(entry)) => Some(format!(
                "Manufacturer verified in national registry: {} ({})",
                entry.name,
                entry.status.as_str()
            )),
            (Some(query), None) => Some(format!(
                "Manufacturer '{}' not found in national registry",
                query
            )),
        }
    }
}

/// Summary counts over the registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_manufacturers: usize,
    pub approved: usize,
    pub provisional: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_state: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ManufacturerRegistry {
    entries: Vec<ManufacturerEntry>,
}

impl ManufacturerRegistry {
    pub fn new(entries: Vec<ManufacturerEntry>) -> Self {
        Self { entries }
    }

    /// Dataset shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_REGISTRY)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<ManufacturerEntry> = serde_json::from_str(json)
            .map_err(|e| MedguardError::Dataset(format!("manufacturer registry: {}", e)))?;
        Ok(Self::new(entries))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MedguardError::Dataset(format!("{}: {}", path.display(), e)))?;
        let registry = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            manufacturers = registry.len(),
            "manufacturer registry loaded"
        );
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ManufacturerEntry] {
        &self.entries
    }

    /// First entry whose name equals, contains, or is contained by `name`
    /// (case-insensitive). Registry order breaks ties.
    pub fn find(&self, name: &str) -> Option<&ManufacturerEntry> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| {
            let candidate = entry.name.to_lowercase();
            candidate == needle || candidate.contains(&needle) || needle.contains(&candidate)
        })
    }

    /// Classify a manufacturer name
    pub fn verify(&self, manufacturer: Option<&str>) -> RegistryCheck {
        let query = manufacturer
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let Some(name) = query.as_deref() else {
            return RegistryCheck {
                query: None,
                entry: None,
                delta: 0.0,
                flag: Some(RiskFlag::NoManufacturerProvided),
            };
        };

        match self.find(name) {
            Some(entry) => {
                let (delta, flag) = match entry.status {
                    RegistryStatus::Approved => (APPROVED_DELTA, None),
                    RegistryStatus::Provisional => {
                        (PROVISIONAL_DELTA, Some(RiskFlag::ProvisionalStatus))
                    }
                    RegistryStatus::Unlisted => (UNLISTED_DELTA, Some(RiskFlag::UnapprovedStatus)),
                };
                RegistryCheck {
                    query: query.clone(),
                    entry: Some(entry.clone()),
                    delta,
                    flag,
                }
            }
            None => RegistryCheck {
                query: query.clone(),
                entry: None,
                delta: UNLISTED_DELTA,
                flag: Some(RiskFlag::ManufacturerNotInRegistry),
            },
        }
    }

    pub fn by_state(&self, state: &str) -> Vec<&ManufacturerEntry> {
        let state = state.trim();
        self.entries
            .iter()
            .filter(|entry| entry.state.eq_ignore_ascii_case(state))
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&ManufacturerEntry> {
        let category = category.trim();
        self.entries
            .iter()
            .filter(|entry| entry.category.eq_ignore_ascii_case(category))
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            total_manufacturers: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            match entry.status {
                RegistryStatus::Approved => stats.approved += 1,
                RegistryStatus::Provisional => stats.provisional += 1,
                RegistryStatus::Unlisted => {}
            }
            *stats.by_category.entry(entry.category.clone()).or_insert(0) += 1;
            *stats.by_state.entry(entry.state.clone()).or_insert(0) += 1;
        }
        stats
    }
}
