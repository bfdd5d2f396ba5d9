//! MedGuard Core: records, collaborator contracts and configuration
//!
//! The engines never talk to a database directly. They consume the
//! [`RecordStore`], [`ScanLogSink`], [`BarcodeDecoder`] and [`BrandResolver`]
//! contracts defined here; [`MemoryStore`] and [`MemoryScanLog`] are the
//! in-process implementations.

pub mod config;
pub mod context;
pub mod data_model;
pub mod error;
pub mod memory;
pub mod scan_log;
pub mod soft_delete;
pub mod store;

pub use config::Settings;
pub use context::RequestContext;
pub use data_model::{
    AlertRecord, BarcodeFormat, BrandMatch, ComplianceStatus, DecodedBarcode, EvidenceSource,
    FakeStatus, GeoPoint, InputType, MedicineDetails, MedicineRecord, SupplierRecord,
    SupplyRecord, VerificationResult,
};
pub use error::{MedguardError, Result};
pub use memory::{MemoryStore, SeedData, Stored};
pub use scan_log::{MemoryScanLog, ScanLogEntry, ScanStats};
pub use soft_delete::{Collection, SoftDelete, Tombstone};
pub use store::{BarcodeDecoder, BrandResolver, RecordStore, ScanLogSink};

/// MedGuard engine version
pub const MEDGUARD_VERSION: &str = env!("CARGO_PKG_VERSION");
