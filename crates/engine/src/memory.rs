//! In-process [`RecordStore`] backed by a map.
//!
//! Used by tests and the `stockpile-bulk` runner. Supports injecting
//! per-record failures and whole-store outages, and counts mutating calls
//! so callers can assert that nothing was written.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use stockpile_core::inventory::{InventoryItem, NewInventoryItem, RecordPatch};
use stockpile_core::types::RecordId;
use tokio::sync::RwLock;

use crate::store::{RecordStore, StoreError};

/// Map-backed record store.
#[derive(Debug)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<RecordId, InventoryItem>>,
    failures: RwLock<HashMap<RecordId, StoreError>>,
    available: AtomicBool,
    mutation_calls: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Create a store pre-populated with `items`, keyed by their ids.
    pub fn with_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let records = items.into_iter().map(|i| (i.id.clone(), i)).collect();
        Self {
            records: RwLock::new(records),
            failures: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            mutation_calls: AtomicUsize::new(0),
        }
    }

    /// Make every update or delete of `id` fail with `error`.
    pub async fn fail_record(&self, id: impl Into<RecordId>, error: StoreError) {
        self.failures.write().await.insert(id.into(), error);
    }

    /// Toggle whole-store availability. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of create/update/delete calls received, failed ones included.
    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub async fn get(&self, id: &str) -> Option<InventoryItem> {
        self.records.read().await.get(id).cloned()
    }

    /// All records, ordered by id.
    pub async fn list(&self) -> Vec<InventoryItem> {
        let mut items: Vec<InventoryItem> = self.records.read().await.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }

    async fn begin_mutation(&self, id: Option<&str>) -> Result<(), StoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if let Some(id) = id {
            if let Some(err) = self.failures.read().await.get(id) {
                return Err(err.clone());
            }
        }
        Ok(())
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn create(&self, fields: NewInventoryItem) -> Result<InventoryItem, StoreError> {
        self.begin_mutation(None).await?;
        fields
            .validate()
            .map_err(|e| StoreError::Constraint(e.to_string()))?;

        let mut records = self.records.write().await;
        if records.values().any(|r| r.sku == fields.sku) {
            return Err(StoreError::Constraint(format!(
                "SKU '{}' already exists",
                fields.sku
            )));
        }
        let item = fields.into_item(uuid::Uuid::now_v7().to_string(), Utc::now());
        records.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn update(&self, id: &str, patch: &RecordPatch) -> Result<InventoryItem, StoreError> {
        self.begin_mutation(Some(id)).await?;
        let mut records = self.records.write().await;
        let item = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !patch.is_empty() {
            item.apply_patch(patch, Utc::now());
        }
        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.begin_mutation(Some(id)).await?;
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use stockpile_core::inventory::ItemStatus;

    use super::*;

    fn new_item(sku: &str) -> NewInventoryItem {
        NewInventoryItem {
            sku: sku.to_string(),
            name: "Widget".to_string(),
            quantity: 4,
            unit_price: dec!(2.50),
            reorder_level: None,
            category_id: None,
            location_id: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_stores_record() {
        let store = MemoryRecordStore::new();
        let item = store.create(new_item("WID-1")).await.expect("create");
        assert!(!item.id.is_empty());
        assert_eq!(store.get(&item.id).await, Some(item.clone()));
        assert_eq!(store.mutation_calls(), 1);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_sku() {
        let store = MemoryRecordStore::new();
        store.create(new_item("WID-1")).await.expect("first create");
        let result = store.create(new_item("WID-1")).await;
        assert_matches!(result, Err(StoreError::Constraint(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields() {
        let store = MemoryRecordStore::new();
        let result = store.create(new_item("bad sku")).await;
        assert_matches!(result, Err(StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn update_applies_patch() {
        let store = MemoryRecordStore::new();
        let item = store.create(new_item("WID-1")).await.expect("create");
        let patch = RecordPatch {
            status: Some(ItemStatus::Archived),
            ..Default::default()
        };
        let updated = store.update(&item.id, &patch).await.expect("update");
        assert_eq!(updated.status, ItemStatus::Archived);
    }

    #[tokio::test]
    async fn empty_patch_leaves_record_untouched() {
        let store = MemoryRecordStore::new();
        let item = store.create(new_item("WID-1")).await.expect("create");
        let updated = store
            .update(&item.id, &RecordPatch::default())
            .await
            .expect("update");
        assert_eq!(updated, item);
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let store = MemoryRecordStore::new();
        let result = store.update("nope", &RecordPatch::default()).await;
        assert_matches!(result, Err(StoreError::NotFound(id)) if id == "nope");
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = MemoryRecordStore::new();
        let item = store.create(new_item("WID-1")).await.expect("create");
        store.delete(&item.id).await.expect("delete");
        assert!(store.is_empty().await);
        assert_matches!(store.delete(&item.id).await, Err(StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn injected_failure_is_returned() {
        let store = MemoryRecordStore::new();
        let item = store.create(new_item("WID-1")).await.expect("create");
        store
            .fail_record(item.id.clone(), StoreError::Constraint("fk".to_string()))
            .await;
        assert_matches!(store.delete(&item.id).await, Err(StoreError::Constraint(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn offline_store_fails_ping_and_mutations() {
        let store = MemoryRecordStore::new();
        store.set_available(false);
        assert_matches!(store.ping().await, Err(StoreError::Unavailable(_)));
        assert_matches!(
            store.create(new_item("WID-1")).await,
            Err(StoreError::Unavailable(_))
        );
        store.set_available(true);
        assert!(store.ping().await.is_ok());
    }
}
