//! Data Model: stored records and the verification contract
//!
//! Stored records use the document store's snake_case field names and accept
//! the loose values found there (`APPROVED` for `ACCEPTED`, `FAKE` for
//! `CONFIRMED_FAKE`). The verification result is camelCase on the wire.

use crate::soft_delete::{SoftDelete, Tombstone};
use chrono::{DateTime, Utc};
use medguard_policy::{FlagSet, RiskFlag, RiskLevel, Verdict};
use serde::{Deserialize, Serialize};

/// Default trust for a supplier with no recorded score
pub const DEFAULT_SUPPLIER_TRUST: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Pending,
    #[serde(alias = "APPROVED")]
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FakeStatus {
    #[serde(rename = "SUSPECTED_FAKE", alias = "SUSPICIOUS")]
    Suspected,
    #[serde(rename = "CONFIRMED_FAKE", alias = "FAKE")]
    Confirmed,
}

/// A supply batch received from a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyRecord {
    pub id: String,
    pub batch_number: String,
    #[serde(default)]
    pub medicine_id: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub compliance_status: Option<ComplianceStatus>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    #[serde(default)]
    pub fake_status: Option<FakeStatus>,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub tombstone: Tombstone,
}

impl SupplyRecord {
    pub fn new(id: impl Into<String>, batch_number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            batch_number: batch_number.into(),
            medicine_id: None,
            supplier_id: None,
            compliance_status: None,
            expiry_date: None,
            risk_flags: Vec::new(),
            fake_status: None,
            quantity: 0,
            temperature: None,
            created_at: None,
            tombstone: Tombstone::live(),
        }
    }

    pub fn with_medicine(mut self, medicine_id: impl Into<String>) -> Self {
        self.medicine_id = Some(medicine_id.into());
        self
    }

    pub fn with_supplier(mut self, supplier_id: impl Into<String>) -> Self {
        self.supplier_id = Some(supplier_id.into());
        self
    }

    pub fn with_compliance(mut self, status: ComplianceStatus) -> Self {
        self.compliance_status = Some(status);
        self
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry_date = Some(expiry);
        self
    }

    pub fn with_fake_status(mut self, status: FakeStatus) -> Self {
        self.fake_status = Some(status);
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.risk_flags.push(flag.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn is_accepted(&self) -> bool {
        self.compliance_status == Some(ComplianceStatus::Accepted)
    }

    pub fn is_rejected(&self) -> bool {
        self.compliance_status == Some(ComplianceStatus::Rejected)
    }

    /// Whole days until expiry, floored; negative once expired
    pub fn days_to_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expiry_date
            .map(|expiry| (expiry - now).num_seconds().div_euclid(86_400))
    }

    /// Stored flags as typed risk flags
    pub fn typed_flags(&self) -> impl Iterator<Item = RiskFlag> + '_ {
        self.risk_flags.iter().map(|raw| RiskFlag::from(raw.as_str()))
    }
}

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub blacklisted: bool,
    /// Running trust score, 0-100
    #[serde(default)]
    pub trust_score: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(flatten)]
    pub tombstone: Tombstone,
}

impl SupplierRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            verified: false,
            blacklisted: false,
            trust_score: None,
            lat: None,
            lng: None,
            tombstone: Tombstone::live(),
        }
    }

    pub fn with_trust(mut self, trust_score: f64) -> Self {
        self.trust_score = Some(trust_score);
        self
    }

    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    pub fn blacklisted(mut self) -> Self {
        self.blacklisted = true;
        self
    }

    pub fn trust(&self) -> f64 {
        self.trust_score.unwrap_or(DEFAULT_SUPPLIER_TRUST)
    }

    /// Coordinates, when both are known
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub tombstone: Tombstone,
}

impl MedicineRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            manufacturer: None,
            category: None,
            description: None,
            tombstone: Tombstone::live(),
        }
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    #[serde(default)]
    pub supply_id: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_alert_severity")]
    pub severity: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub tombstone: Tombstone,
}

fn default_alert_severity() -> String {
    "MEDIUM".to_string()
}

impl AlertRecord {
    pub fn new(id: impl Into<String>, supply_id: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supply_id: Some(supply_id.into()),
            message: String::new(),
            severity: severity.into(),
            created_at: None,
            tombstone: Tombstone::live(),
        }
    }

    pub fn level(&self) -> RiskLevel {
        RiskLevel::parse_lenient(&self.severity)
    }
}

macro_rules! impl_soft_delete {
    ($ty:ty, $kind:literal) => {
        impl SoftDelete for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn tombstone(&self) -> &Tombstone {
                &self.tombstone
            }

            fn tombstone_mut(&mut self) -> &mut Tombstone {
                &mut self.tombstone
            }
        }
    };
}

impl_soft_delete!(SupplyRecord, "supply");
impl_soft_delete!(SupplierRecord, "supplier");
impl_soft_delete!(MedicineRecord, "medicine");
impl_soft_delete!(AlertRecord, "alert");

/// How a verification request arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Batch,
    Barcode,
    MedicineName,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Batch => "batch",
            InputType::Barcode => "barcode",
            InputType::MedicineName => "medicine_name",
        }
    }
}

/// Evidence source that contributed to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceSource {
    Database,
    Registry,
    BrandMapping,
    PatternAnalysis,
}

/// Structured product details returned alongside a verdict
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
    pub database_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inferred_manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_manufacturers: Vec<String>,
}

/// Output of every verification entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verdict: Verdict,
    /// 0-100, one decimal
    pub confidence: f64,
    pub risk_flags: FlagSet,
    pub recommendation: String,
    pub reasoning: Vec<String>,
    pub medicine_details: Option<MedicineDetails>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<EvidenceSource>,
}

impl VerificationResult {
    /// Result for input that could not be evaluated at all
    pub fn rejected_input(flag: RiskFlag, reason: impl Into<String>) -> Self {
        let mut flags = FlagSet::new();
        flags.push(flag);
        let verdict = Verdict::Unknown;
        Self {
            verdict,
            confidence: 0.0,
            recommendation: medguard_policy::recommend(verdict, &flags),
            risk_flags: flags,
            reasoning: vec![reason.into()],
            medicine_details: None,
            sources: Vec::new(),
        }
    }
}

/// Fields recovered from a barcode payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedBarcode {
    pub batch_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_code: Option<String>,
    pub format: BarcodeFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    PipeSeparated,
    UnderscoreSeparated,
    DashSeparated,
    EanUpc,
    #[default]
    SimpleBatch,
}

/// A brand name resolved to its manufacturers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandMatch {
    pub brand_name: String,
    pub manufacturers: Vec<String>,
    pub primary_manufacturer: Option<String>,
    pub category: String,
    /// Match quality, 0-100
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_supply_accepts_loose_document_values() {
        let json = r#"{
            "id": "s-1",
            "batch_number": "CPL-123456",
            "compliance_status": "APPROVED",
            "fake_status": "FAKE",
            "risk_flags": ["TEMPERATURE_BREACH"],
            "is_deleted": false
        }"#;
        let supply: SupplyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(supply.compliance_status, Some(ComplianceStatus::Accepted));
        assert_eq!(supply.fake_status, Some(FakeStatus::Confirmed));
        assert_eq!(supply.quantity, 0);
        assert!(!supply.is_deleted());

        let supply: SupplyRecord = serde_json::from_str(
            r#"{"id": "s-2", "batch_number": "X", "fake_status": "SUSPICIOUS", "compliance_status": "ACCEPTED"}"#,
        )
        .unwrap();
        assert_eq!(supply.fake_status, Some(FakeStatus::Suspected));
        assert!(supply.is_accepted());
    }

    #[test]
    fn test_canonical_serialization() {
        let supply = SupplyRecord::new("s-1", "B1")
            .with_compliance(ComplianceStatus::Accepted)
            .with_fake_status(FakeStatus::Suspected);
        let value = serde_json::to_value(&supply).unwrap();
        assert_eq!(value["compliance_status"], "ACCEPTED");
        assert_eq!(value["fake_status"], "SUSPECTED_FAKE");
        assert_eq!(value["is_deleted"], false);
    }

    #[test]
    fn test_days_to_expiry_floors() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
        let supply = SupplyRecord::new("s", "b").with_expiry(now + Duration::hours(36));
        assert_eq!(supply.days_to_expiry(now), Some(1));

        let supply = SupplyRecord::new("s", "b").with_expiry(now - Duration::hours(1));
        assert_eq!(supply.days_to_expiry(now), Some(-1));

        assert_eq!(SupplyRecord::new("s", "b").days_to_expiry(now), None);
    }

    #[test]
    fn test_supplier_defaults() {
        let supplier: SupplierRecord =
            serde_json::from_str(r#"{"id": "sup-1", "name": "Acme"}"#).unwrap();
        assert_eq!(supplier.trust(), DEFAULT_SUPPLIER_TRUST);
        assert!(supplier.location().is_none());

        let supplier = supplier.with_location(23.8, 90.4);
        assert_eq!(supplier.location(), Some(GeoPoint { lat: 23.8, lng: 90.4 }));
    }

    #[test]
    fn test_verification_result_wire_shape() {
        let result = VerificationResult::rejected_input(
            RiskFlag::EmptyBatchNumber,
            "No batch number provided",
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["verdict"], "UNKNOWN");
        assert_eq!(value["confidence"], 0.0);
        assert_eq!(value["riskFlags"][0], "empty_batch_number");
        assert!(value["medicineDetails"].is_null());
        assert!(value.get("sources").is_none());
        assert!(value["recommendation"].as_str().unwrap().len() > 10);
    }

    #[test]
    fn test_alert_severity_default() {
        let alert: AlertRecord = serde_json::from_str(r#"{"id": "a-1", "supply_id": "s-1"}"#).unwrap();
        assert_eq!(alert.level(), RiskLevel::Medium);
    }
}
