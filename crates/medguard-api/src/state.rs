//! Shared application state, assembled once at start-up.
use crate::metrics::{ApiMetrics, MeteredScanLog};
use medguard_analytics::AnalyticsEngine;
use medguard_core::{MedguardError, MemoryScanLog, MemoryStore, RecordStore, Result, SeedData, Settings};
use medguard_registry::{BrandCatalog, ManufacturerRegistry};
use medguard_verify::EvidenceAggregator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<EvidenceAggregator>,
    pub analytics: AnalyticsEngine,
    pub brands: Arc<BrandCatalog>,
    pub scan_log: Arc<MemoryScanLog>,
    pub metrics: ApiMetrics,
}

impl AppState {
    /// Wire the engines over an existing store and datasets
    pub fn new(
        store: Arc<dyn RecordStore>,
        registry: ManufacturerRegistry,
        brands: BrandCatalog,
        settings: &Settings,
    ) -> Result<Self> {
        let metrics =
            ApiMetrics::new().map_err(|e| MedguardError::Internal(format!("metrics: {}", e)))?;
        let scan_log = Arc::new(MemoryScanLog::new());
        let brands = Arc::new(brands);

        let aggregator = EvidenceAggregator::new(
            store.clone(),
            Arc::new(MeteredScanLog::new(scan_log.clone(), metrics.clone())),
            registry,
        )
        .with_brands(brands.clone())
        .with_lookup_timeout(settings.lookup_timeout());

        Ok(Self {
            aggregator: Arc::new(aggregator),
            analytics: AnalyticsEngine::new(store),
            brands,
            scan_log,
            metrics,
        })
    }

    /// Load datasets and the seed store named in the settings. Unset paths
    /// fall back to the built-in datasets and an empty store.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let registry = match &settings.registry_path {
            Some(path) => ManufacturerRegistry::load(path)?,
            None => ManufacturerRegistry::builtin()?,
        };
        let brands = match &settings.brands_path {
            Some(path) => BrandCatalog::load(path)?,
            None => BrandCatalog::builtin()?,
        };
        let store = match &settings.seed_path {
            Some(path) => MemoryStore::from_seed(SeedData::load(path)?),
            None => MemoryStore::new(),
        };

        tracing::info!(
            manufacturers = registry.len(),
            brands = brands.len(),
            "datasets loaded"
        );
        Self::new(Arc::new(store), registry, brands, settings)
    }
}
