//! MedGuard Registry: static datasets injected at start-up
//!
//! - [`ManufacturerRegistry`]: national manufacturer authority registry
//! - [`BrandCatalog`]: brand name → manufacturers
//! - [`PrefixTable`]: batch-code prefix → manufacturer and trust rating
//!
//! Each is loaded once and passed into the engines as a read-only dependency.

pub mod brands;
pub mod manufacturers;
pub mod prefixes;

pub use brands::{BrandCatalog, BrandEntry};
pub use manufacturers::{
    ManufacturerEntry, ManufacturerRegistry, RegistryCheck, RegistryStats, RegistryStatus,
    APPROVED_DELTA, PROVISIONAL_DELTA, UNLISTED_DELTA,
};
pub use prefixes::{PrefixEntry, PrefixMatch, PrefixTable};
