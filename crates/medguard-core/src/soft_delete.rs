//! Soft delete
//!
//! Every persisted entity carries a tombstone. Read paths see only live
//! records; `restore` brings a record back and `purge` removes it for good.

use crate::error::{MedguardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deletion marker embedded in every record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tombstone {
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tombstone {
    pub fn live() -> Self {
        Self::default()
    }

    pub fn deleted(at: DateTime<Utc>) -> Self {
        Self {
            is_deleted: true,
            deleted_at: Some(at),
        }
    }
}

/// A record that can be moved to and from the recycle bin
pub trait SoftDelete {
    /// Entity name used in error messages
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn tombstone(&self) -> &Tombstone;
    fn tombstone_mut(&mut self) -> &mut Tombstone;

    fn is_deleted(&self) -> bool {
        self.tombstone().is_deleted
    }
}

/// Insertion-ordered set of records of one kind
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: SoftDelete + Clone> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id
    pub fn upsert(&mut self, item: T) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    /// Live record by id
    pub fn get(&self, id: &str) -> Option<&T> {
        self.items
            .iter()
            .find(|item| item.id() == id && !item.is_deleted())
    }

    /// Live records in insertion order
    pub fn live(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|item| !item.is_deleted())
    }

    /// Records currently in the recycle bin
    pub fn deleted(&self) -> Vec<T> {
        self.items
            .iter()
            .filter(|item| item.is_deleted())
            .cloned()
            .collect()
    }

    pub fn soft_delete(&mut self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id && !item.is_deleted())
            .ok_or_else(|| MedguardError::NotFound(format!("{} {}", T::KIND, id)))?;
        *item.tombstone_mut() = Tombstone::deleted(at);
        Ok(())
    }

    pub fn restore(&mut self, id: &str) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id && item.is_deleted())
            .ok_or_else(|| MedguardError::NotFound(format!("deleted {} {}", T::KIND, id)))?;
        *item.tombstone_mut() = Tombstone::live();
        Ok(())
    }

    /// Permanently remove a record that is already in the recycle bin
    pub fn purge(&mut self, id: &str) -> Result<T> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id && item.is_deleted())
            .ok_or_else(|| MedguardError::NotFound(format!("deleted {} {}", T::KIND, id)))?;
        Ok(self.items.remove(index))
    }

    /// Count of live records
    pub fn len(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Item {
        id: String,
        tombstone: Tombstone,
    }

    impl Item {
        fn new(id: &str) -> Self {
            Self {
                id: id.to_string(),
                tombstone: Tombstone::live(),
            }
        }
    }

    impl SoftDelete for Item {
        const KIND: &'static str = "item";

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

    fn collection() -> Collection<Item> {
        let mut c = Collection::new();
        c.upsert(Item::new("a"));
        c.upsert(Item::new("b"));
        c.upsert(Item::new("c"));
        c
    }

    #[test]
    fn test_soft_delete_hides_record() {
        let mut c = collection();
        c.soft_delete("b", Utc::now()).unwrap();

        assert!(c.get("b").is_none());
        assert_eq!(c.len(), 2);
        let ids: Vec<&str> = c.live().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(c.deleted().len(), 1);
        assert!(c.deleted()[0].tombstone.deleted_at.is_some());
    }

    #[test]
    fn test_restore_brings_record_back() {
        let mut c = collection();
        c.soft_delete("a", Utc::now()).unwrap();
        c.restore("a").unwrap();

        assert!(c.get("a").is_some());
        assert!(c.deleted().is_empty());
        assert!(c.restore("a").is_err());
    }

    #[test]
    fn test_purge_requires_deleted_record() {
        let mut c = collection();
        assert!(matches!(c.purge("a"), Err(MedguardError::NotFound(_))));

        c.soft_delete("a", Utc::now()).unwrap();
        let purged = c.purge("a").unwrap();
        assert_eq!(purged.id, "a");
        assert!(c.deleted().is_empty());
        assert!(c.restore("a").is_err());
    }

    #[test]
    fn test_double_delete_is_not_found() {
        let mut c = collection();
        c.soft_delete("c", Utc::now()).unwrap();
        let err = c.soft_delete("c", Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "NOT_FOUND/item c");
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut c = collection();
        let mut replacement = Item::new("a");
        replacement.tombstone = Tombstone::deleted(Utc::now());
        c.upsert(replacement);
        assert!(c.get("a").is_none());
        assert_eq!(c.len(), 2);
    }
}
