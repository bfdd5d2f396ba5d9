//! Batch-code prefix table
//!
//! Maps the leading letters of a batch code to the manufacturer that uses
//! them, with a static trust rating per manufacturer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shortest prefix considered
pub const MIN_PREFIX_LEN: usize = 2;
/// Longest prefix considered
pub const MAX_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixEntry {
    pub manufacturer: String,
    pub country: String,
    /// Static trust rating, 0-100
    pub trust: f64,
}

/// A prefix recognised in a batch code
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixMatch<'a> {
    pub prefix: String,
    pub entry: &'a PrefixEntry,
}

#[derive(Debug, Clone)]
pub struct PrefixTable {
    entries: BTreeMap<String, PrefixEntry>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        let rows: [(&str, &str, &str, f64); 10] = [
            ("BD", "Beximco", "Bangladesh", 85.0),
            ("SQ", "Square", "Bangladesh", 90.0),
            ("INC", "Incepta", "Bangladesh", 85.0),
            ("ACI", "ACI", "Bangladesh", 88.0),
            ("AMX", "Amoxil", "Various", 70.0),
            ("PCM", "Paracetamol Generic", "Various", 65.0),
            ("CPL", "Cipla", "India", 92.0),
            ("SUN", "Sun Pharma", "India", 90.0),
            ("TOR", "Torrent", "India", 85.0),
            ("LUP", "Lupin", "India", 87.0),
        ];
        let entries = rows
            .into_iter()
            .map(|(prefix, manufacturer, country, trust)| {
                (
                    prefix.to_string(),
                    PrefixEntry {
                        manufacturer: manufacturer.to_string(),
                        country: country.to_string(),
                        trust,
                    },
                )
            })
            .collect();
        Self { entries }
    }
}

impl PrefixTable {
    pub fn new(entries: BTreeMap<String, PrefixEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, prefix: &str) -> Option<&PrefixEntry> {
        self.entries.get(&prefix.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leading ASCII letters of the code, uppercased, capped at the longest
    /// prefix length. Empty when the code does not start with two letters.
    pub fn leading_letters(batch_code: &str) -> String {
        let letters: String = batch_code
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .take(MAX_PREFIX_LEN)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if letters.len() < MIN_PREFIX_LEN {
            String::new()
        } else {
            letters
        }
    }

    /// Longest known prefix at the start of the code
    pub fn infer(&self, batch_code: &str) -> Option<PrefixMatch<'_>> {
        let letters = Self::leading_letters(batch_code);
        (MIN_PREFIX_LEN..=letters.len()).rev().find_map(|len| {
            let candidate = &letters[..len];
            self.entries.get(candidate).map(|entry| PrefixMatch {
                prefix: candidate.to_string(),
                entry,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_letters() {
        assert_eq!(PrefixTable::leading_letters("cpl-123456"), "CPL");
        assert_eq!(PrefixTable::leading_letters("BATCH001"), "BATC");
        assert_eq!(PrefixTable::leading_letters("B12"), "");
        assert_eq!(PrefixTable::leading_letters("123"), "");
        assert_eq!(PrefixTable::leading_letters("ÄB-1"), "");
    }

    #[test]
    fn test_infer_known_prefixes() {
        let table = PrefixTable::default();
        let found = table.infer("CPL-123456").unwrap();
        assert_eq!(found.prefix, "CPL");
        assert_eq!(found.entry.manufacturer, "Cipla");
        assert_eq!(found.entry.trust, 92.0);

        let found = table.infer("bd-24A7781").unwrap();
        assert_eq!(found.prefix, "BD");
        assert_eq!(found.entry.manufacturer, "Beximco");
    }

    #[test]
    fn test_infer_prefers_longest_prefix() {
        let table = PrefixTable::default();
        assert_eq!(table.infer("SQUARE77").unwrap().prefix, "SQ");
        assert_eq!(table.infer("SUNX1234").unwrap().prefix, "SUN");
    }

    #[test]
    fn test_unknown_prefix() {
        let table = PrefixTable::default();
        assert!(table.infer("BATCH001").is_none());
        assert!(table.infer("XY-1234").is_none());
        assert!(table.infer("").is_none());
        assert_eq!(table.len(), 10);
    }
}
