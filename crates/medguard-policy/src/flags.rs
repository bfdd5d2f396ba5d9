//! Risk flags
//!
//! Tags attached to a verification result. Flags keep insertion order and are
//! deduplicated; a small subset is critical and forces the worst verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single risk tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskFlag {
    EmptyBatchNumber,
    EmptyMedicineName,
    NoManufacturerProvided,
    ManufacturerNotInRegistry,
    ProvisionalStatus,
    UnapprovedStatus,
    NotInDatabase,
    LowTrustSupplier,
    Expired,
    NearExpiry,
    ComplianceRejected,
    CompliancePending,
    SuspectedFake,
    ConfirmedCounterfeit,
    MatchesFakePattern,
    HighFakeSimilarity,
    RepetitionAnomaly,
    LengthAnomaly,
    InvalidFormat,
    MedicineNotInBrandMapping,
    BarcodeReadFailed,
    SystemError,
    /// Free-form flag carried on a stored supply record
    Supply(String),
}

const NAMED: [RiskFlag; 22] = [
    RiskFlag::EmptyBatchNumber,
    RiskFlag::EmptyMedicineName,
    RiskFlag::NoManufacturerProvided,
    RiskFlag::ManufacturerNotInRegistry,
    RiskFlag::ProvisionalStatus,
    RiskFlag::UnapprovedStatus,
    RiskFlag::NotInDatabase,
    RiskFlag::LowTrustSupplier,
    RiskFlag::Expired,
    RiskFlag::NearExpiry,
    RiskFlag::ComplianceRejected,
    RiskFlag::CompliancePending,
    RiskFlag::SuspectedFake,
    RiskFlag::ConfirmedCounterfeit,
    RiskFlag::MatchesFakePattern,
    RiskFlag::HighFakeSimilarity,
    RiskFlag::RepetitionAnomaly,
    RiskFlag::LengthAnomaly,
    RiskFlag::InvalidFormat,
    RiskFlag::MedicineNotInBrandMapping,
    RiskFlag::BarcodeReadFailed,
    RiskFlag::SystemError,
];

impl RiskFlag {
    /// Wire name of the flag
    pub fn as_str(&self) -> &str {
        match self {
            RiskFlag::EmptyBatchNumber => "empty_batch_number",
            RiskFlag::EmptyMedicineName => "empty_medicine_name",
            RiskFlag::NoManufacturerProvided => "no_manufacturer_provided",
            RiskFlag::ManufacturerNotInRegistry => "manufacturer_not_in_registry",
            RiskFlag::ProvisionalStatus => "provisional_status",
            RiskFlag::UnapprovedStatus => "unapproved_status",
            RiskFlag::NotInDatabase => "not_in_database",
            RiskFlag::LowTrustSupplier => "low_trust_supplier",
            RiskFlag::Expired => "expired",
            RiskFlag::NearExpiry => "near_expiry",
            RiskFlag::ComplianceRejected => "compliance_rejected",
            RiskFlag::CompliancePending => "compliance_pending",
            RiskFlag::SuspectedFake => "suspected_fake",
            RiskFlag::ConfirmedCounterfeit => "confirmed_counterfeit",
            RiskFlag::MatchesFakePattern => "matches_fake_pattern",
            RiskFlag::HighFakeSimilarity => "high_fake_similarity",
            RiskFlag::RepetitionAnomaly => "repetition_anomaly",
            RiskFlag::LengthAnomaly => "length_anomaly",
            RiskFlag::InvalidFormat => "invalid_format",
            RiskFlag::MedicineNotInBrandMapping => "medicine_not_in_brand_mapping",
            RiskFlag::BarcodeReadFailed => "barcode_read_failed",
            RiskFlag::SystemError => "system_error",
            RiskFlag::Supply(raw) => raw.as_str(),
        }
    }

    /// Critical flags force `HIGH_RISK_FAKE` regardless of confidence
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            RiskFlag::ConfirmedCounterfeit | RiskFlag::MatchesFakePattern
        )
    }

    /// Case-insensitive keyword test against the wire name
    pub fn mentions(&self, keyword: &str) -> bool {
        self.as_str()
            .to_ascii_uppercase()
            .contains(&keyword.to_ascii_uppercase())
    }
}

impl From<String> for RiskFlag {
    fn from(raw: String) -> Self {
        NAMED
            .iter()
            .find(|flag| flag.as_str().eq_ignore_ascii_case(raw.trim()))
            .cloned()
            .unwrap_or(RiskFlag::Supply(raw))
    }
}

impl From<&str> for RiskFlag {
    fn from(raw: &str) -> Self {
        RiskFlag::from(raw.to_string())
    }
}

impl From<RiskFlag> for String {
    fn from(flag: RiskFlag) -> Self {
        match flag {
            RiskFlag::Supply(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, deduplicated collection of flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet(Vec<RiskFlag>);

impl FlagSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append unless already present. Returns whether the flag was new.
    pub fn push(&mut self, flag: RiskFlag) -> bool {
        if self.0.contains(&flag) {
            return false;
        }
        self.0.push(flag);
        true
    }

    pub fn extend<I>(&mut self, flags: I)
    where
        I: IntoIterator<Item = RiskFlag>,
    {
        for flag in flags {
            self.push(flag);
        }
    }

    pub fn contains(&self, flag: &RiskFlag) -> bool {
        self.0.contains(flag)
    }

    pub fn has_critical(&self) -> bool {
        self.0.iter().any(RiskFlag::is_critical)
    }

    /// Whether any flag mentions the keyword
    pub fn mentions(&self, keyword: &str) -> bool {
        self.0.iter().any(|flag| flag.mentions(keyword))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RiskFlag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<RiskFlag> {
        self.0
    }

    /// Wire names in order
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|flag| flag.as_str().to_string()).collect()
    }
}

impl FromIterator<RiskFlag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = RiskFlag>>(iter: I) -> Self {
        let mut set = FlagSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for FlagSet {
    type Item = RiskFlag;
    type IntoIter = std::vec::IntoIter<RiskFlag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a RiskFlag;
    type IntoIter = std::slice::Iter<'a, RiskFlag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_flags_round_trip_through_strings() {
        for flag in NAMED.iter() {
            assert_eq!(&RiskFlag::from(flag.as_str()), flag);
        }
    }

    #[test]
    fn test_supply_flags_are_case_insensitive() {
        assert_eq!(RiskFlag::from("EXPIRED"), RiskFlag::Expired);
        assert_eq!(
            RiskFlag::from("TEMPERATURE_BREACH"),
            RiskFlag::Supply("TEMPERATURE_BREACH".to_string())
        );
    }

    #[test]
    fn test_critical_flags() {
        assert!(RiskFlag::ConfirmedCounterfeit.is_critical());
        assert!(RiskFlag::MatchesFakePattern.is_critical());
        assert!(!RiskFlag::SuspectedFake.is_critical());
        assert!(!RiskFlag::Expired.is_critical());
        assert!(!RiskFlag::Supply("confirmed_counterfeit_maybe".into()).is_critical());
    }

    #[test]
    fn test_flag_set_dedups_and_keeps_order() {
        let mut set = FlagSet::new();
        assert!(set.push(RiskFlag::NotInDatabase));
        assert!(set.push(RiskFlag::InvalidFormat));
        assert!(!set.push(RiskFlag::NotInDatabase));
        set.extend(vec![RiskFlag::LengthAnomaly, RiskFlag::InvalidFormat]);

        assert_eq!(
            set.to_strings(),
            vec!["not_in_database", "invalid_format", "length_anomaly"]
        );
        assert!(!set.has_critical());
    }

    #[test]
    fn test_mentions_keyword() {
        let set: FlagSet = vec![RiskFlag::from("temperature_excursion")]
            .into_iter()
            .collect();
        assert!(set.mentions("TEMPERATURE"));
        assert!(!set.mentions("VERIFY"));
    }

    #[test]
    fn test_serialization() {
        let set: FlagSet = vec![RiskFlag::Expired, RiskFlag::from("COLD_CHAIN")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["expired","COLD_CHAIN"]"#);

        let parsed: FlagSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }
}
