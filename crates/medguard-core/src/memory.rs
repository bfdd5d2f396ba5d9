//! In-memory record store
//!
//! Backs the service when no external store is configured and serves as the
//! test double for the engines. Seeded from a JSON document.

use crate::data_model::{AlertRecord, MedicineRecord, SupplierRecord, SupplyRecord};
use crate::error::{MedguardError, Result};
use crate::soft_delete::{Collection, SoftDelete};
use crate::store::RecordStore;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;

/// Seed document: one array per collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub suppliers: Vec<SupplierRecord>,
    #[serde(default)]
    pub medicines: Vec<MedicineRecord>,
    #[serde(default)]
    pub supplies: Vec<SupplyRecord>,
    #[serde(default)]
    pub alerts: Vec<AlertRecord>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MedguardError::Dataset(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }
}

#[derive(Debug, Default)]
pub struct Collections {
    pub supplies: Collection<SupplyRecord>,
    pub suppliers: Collection<SupplierRecord>,
    pub medicines: Collection<MedicineRecord>,
    pub alerts: Collection<AlertRecord>,
}

/// Record types held by the in-memory store
pub trait Stored: SoftDelete + Clone + Send + Sync + 'static {
    fn collection(collections: &Collections) -> &Collection<Self>;
    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self>;
}

macro_rules! impl_stored {
    ($ty:ty, $field:ident) => {
        impl Stored for $ty {
            fn collection(collections: &Collections) -> &Collection<Self> {
                &collections.$field
            }

            fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
                &mut collections.$field
            }
        }
    };
}

impl_stored!(SupplyRecord, supplies);
impl_stored!(SupplierRecord, suppliers);
impl_stored!(MedicineRecord, medicines);
impl_stored!(AlertRecord, alerts);

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let mut collections = Collections::default();
        seed.suppliers
            .into_iter()
            .for_each(|r| collections.suppliers.upsert(r));
        seed.medicines
            .into_iter()
            .for_each(|r| collections.medicines.upsert(r));
        seed.supplies
            .into_iter()
            .for_each(|r| collections.supplies.upsert(r));
        seed.alerts
            .into_iter()
            .for_each(|r| collections.alerts.upsert(r));
        Self {
            inner: RwLock::new(collections),
        }
    }

    /// Insert or replace a record by id
    pub async fn insert<T: Stored>(&self, record: T) {
        let mut inner = self.inner.write().await;
        T::collection_mut(&mut inner).upsert(record);
    }

    pub async fn get<T: Stored>(&self, id: &str) -> Option<T> {
        let inner = self.inner.read().await;
        let found = T::collection(&inner).get(id).cloned();
        found
    }

    /// Move a record to the recycle bin
    pub async fn soft_delete<T: Stored>(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        T::collection_mut(&mut inner).soft_delete(id, Utc::now())?;
        tracing::info!(kind = T::KIND, id, "record moved to recycle bin");
        Ok(())
    }

    pub async fn restore<T: Stored>(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        T::collection_mut(&mut inner).restore(id)?;
        tracing::info!(kind = T::KIND, id, "record restored");
        Ok(())
    }

    /// Permanently delete a record from the recycle bin
    pub async fn purge<T: Stored>(&self, id: &str) -> Result<T> {
        let mut inner = self.inner.write().await;
        let record = T::collection_mut(&mut inner).purge(id)?;
        tracing::info!(kind = T::KIND, id, "record purged");
        Ok(record)
    }

    pub async fn list_deleted<T: Stored>(&self) -> Vec<T> {
        let inner = self.inner.read().await;
        let deleted = T::collection(&inner).deleted();
        deleted
    }

    async fn live<T: Stored>(&self) -> Vec<T> {
        let inner = self.inner.read().await;
        let records: Vec<T> = T::collection(&inner).live().cloned().collect();
        records
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_supply_by_batch(&self, batch_number: &str) -> Result<Option<SupplyRecord>> {
        let inner = self.inner.read().await;
        // bind before returning so the iterator is dropped ahead of the guard
        let found = inner
            .supplies
            .live()
            .find(|supply| supply.batch_number == batch_number)
            .cloned();
        Ok(found)
    }

    async fn find_medicine(&self, id: &str) -> Result<Option<MedicineRecord>> {
        Ok(self.get::<MedicineRecord>(id).await)
    }

    async fn find_supplier(&self, id: &str) -> Result<Option<SupplierRecord>> {
        Ok(self.get::<SupplierRecord>(id).await)
    }

    async fn supplies(&self) -> Result<Vec<SupplyRecord>> {
        Ok(self.live::<SupplyRecord>().await)
    }

    async fn suppliers(&self) -> Result<Vec<SupplierRecord>> {
        Ok(self.live::<SupplierRecord>().await)
    }

    async fn alerts(&self) -> Result<Vec<AlertRecord>> {
        Ok(self.live::<AlertRecord>().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryStore {
        MemoryStore::from_seed(SeedData {
            suppliers: vec![SupplierRecord::new("sup-1", "Acme").with_trust(90.0)],
            medicines: vec![MedicineRecord::new("med-1", "Paracetamol")],
            supplies: vec![
                SupplyRecord::new("s-1", "CPL-123456")
                    .with_medicine("med-1")
                    .with_supplier("sup-1"),
                SupplyRecord::new("s-2", "BD-0111"),
            ],
            alerts: vec![],
        })
    }

    #[tokio::test]
    async fn test_find_supply_by_batch_is_exact() {
        let store = seeded();
        let found = store.find_supply_by_batch("CPL-123456").await.unwrap();
        assert_eq!(found.map(|s| s.id), Some("s-1".to_string()));
        assert!(store.find_supply_by_batch("cpl-123456").await.unwrap().is_none());
        assert!(store.find_supply_by_batch("CPL-12345").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_soft_deleted_records_are_invisible() {
        let store = seeded();
        store.soft_delete::<SupplyRecord>("s-1").await.unwrap();

        assert!(store.find_supply_by_batch("CPL-123456").await.unwrap().is_none());
        assert_eq!(store.supplies().await.unwrap().len(), 1);
        assert_eq!(store.list_deleted::<SupplyRecord>().await.len(), 1);

        store.restore::<SupplyRecord>("s-1").await.unwrap();
        assert!(store.find_supply_by_batch("CPL-123456").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_recycle_bin_is_per_entity_type() {
        let store = seeded();
        store.soft_delete::<SupplierRecord>("sup-1").await.unwrap();

        assert!(store.find_supplier("sup-1").await.unwrap().is_none());
        assert!(store.list_deleted::<SupplyRecord>().await.is_empty());
        assert!(store.soft_delete::<MedicineRecord>("sup-1").await.is_err());

        let purged = store.purge::<SupplierRecord>("sup-1").await.unwrap();
        assert_eq!(purged.name, "Acme");
        assert!(store.list_deleted::<SupplierRecord>().await.is_empty());
    }

    #[test]
    fn test_seed_from_json() {
        let seed = SeedData::from_json(
            r#"{"supplies": [{"id": "s-1", "batch_number": "B1", "compliance_status": "REJECTED"}]}"#,
        )
        .unwrap();
        assert_eq!(seed.supplies.len(), 1);
        assert!(seed.suppliers.is_empty());
        assert!(SeedData::from_json("{").is_err());
    }

    #[test]
    fn test_seed_missing_file_is_dataset_error() {
        let err = SeedData::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, MedguardError::Dataset(_)));
    }
}
