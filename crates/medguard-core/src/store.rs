//! Collaborator contracts consumed by the verification and analytics engines

use crate::data_model::{
    AlertRecord, BrandMatch, DecodedBarcode, MedicineRecord, SupplierRecord, SupplyRecord,
};
use crate::error::Result;
use crate::scan_log::ScanLogEntry;
use async_trait::async_trait;

/// Read access to the record store. Every method sees live records only.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Exact batch-number match
    async fn find_supply_by_batch(&self, batch_number: &str) -> Result<Option<SupplyRecord>>;

    async fn find_medicine(&self, id: &str) -> Result<Option<MedicineRecord>>;

    async fn find_supplier(&self, id: &str) -> Result<Option<SupplierRecord>>;

    /// Full scan of supplies
    async fn supplies(&self) -> Result<Vec<SupplyRecord>>;

    /// Full scan of suppliers
    async fn suppliers(&self) -> Result<Vec<SupplierRecord>>;

    /// Full scan of alerts
    async fn alerts(&self) -> Result<Vec<AlertRecord>>;
}

/// Append-only audit trail of verification attempts
#[async_trait]
pub trait ScanLogSink: Send + Sync {
    /// Persist an entry, returning its id
    async fn append(&self, entry: ScanLogEntry) -> Result<String>;
}

/// Turns scanned bytes into batch/manufacturer fields
#[async_trait]
pub trait BarcodeDecoder: Send + Sync {
    async fn decode(&self, payload: &[u8]) -> Result<DecodedBarcode>;
}

/// Static brand name → manufacturer mapping
pub trait BrandResolver: Send + Sync {
    fn resolve(&self, medicine_name: &str) -> Option<BrandMatch>;
}
