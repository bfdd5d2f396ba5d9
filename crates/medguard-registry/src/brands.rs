//! Brand catalog: medicine brand name → manufacturers

use medguard_core::{BrandMatch, BrandResolver, MedguardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN_BRANDS: &str = include_str!("../data/brands.json");

/// Match quality for an exact brand name
pub const EXACT_MATCH: f64 = 100.0;
/// Match quality when the brand name contains the query
pub const CONTAINS_MATCH: f64 = 85.0;
/// Match quality when the query contains the brand name
pub const REVERSE_MATCH: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandEntry {
    pub brand_name: String,
    #[serde(default)]
    pub manufacturers: Vec<String>,
    #[serde(default)]
    pub primary_manufacturer: Option<String>,
    #[serde(default = "unknown_category")]
    pub category: String,
}

fn unknown_category() -> String {
    "Unknown".to_string()
}

impl BrandEntry {
    fn to_match(&self, confidence: f64) -> BrandMatch {
        BrandMatch {
            brand_name: self.brand_name.clone(),
            manufacturers: self.manufacturers.clone(),
            primary_manufacturer: self
                .primary_manufacturer
                .clone()
                .or_else(|| self.manufacturers.first().cloned()),
            category: self.category.clone(),
            confidence,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BrandDocument {
    #[serde(default)]
    medicine_brands: Vec<BrandEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct BrandCatalog {
    entries: Vec<BrandEntry>,
}

impl BrandCatalog {
    pub fn new(entries: Vec<BrandEntry>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_BRANDS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let doc: BrandDocument = serde_json::from_str(json)
            .map_err(|e| MedguardError::Dataset(format!("brand catalog: {}", e)))?;
        Ok(Self::new(doc.medicine_brands))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MedguardError::Dataset(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), brands = catalog.len(), "brand catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact, then brand-contains-query, then query-contains-brand
    pub fn lookup(&self, name: &str) -> Option<BrandMatch> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let lowered: Vec<(String, &BrandEntry)> = self
            .entries
            .iter()
            .map(|entry| (entry.brand_name.to_lowercase(), entry))
            .collect();

        if let Some((_, entry)) = lowered.iter().find(|(brand, _)| *brand == query) {
            return Some(entry.to_match(EXACT_MATCH));
        }
        if let Some((_, entry)) = lowered.iter().find(|(brand, _)| brand.contains(&query)) {
            return Some(entry.to_match(CONTAINS_MATCH));
        }
        lowered
            .iter()
            .find(|(brand, _)| query.contains(brand.as_str()))
            .map(|(_, entry)| entry.to_match(REVERSE_MATCH))
    }

    pub fn brands(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.brand_name.as_str()).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&BrandEntry> {
        let category = category.trim();
        self.entries
            .iter()
            .filter(|e| e.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Brand count per category
    pub fn categories(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.category.clone()).or_insert(0) += 1;
        }
        counts
    }
}

impl BrandResolver for BrandCatalog {
    fn resolve(&self, medicine_name: &str) -> Option<BrandMatch> {
        self.lookup(medicine_name)
    }
}
