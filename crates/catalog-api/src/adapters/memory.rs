//! In-memory store.
//!
//! Substitute for the remote store in tests and local runs. A single mutex
//! guards all items so a delta is applied in one critical section, the same
//! guarantee the remote procedure gives.

use crate::domain::{CountDelta, Group, Item, ItemSummary, RecordId, StoreError, StoreResult};
use crate::ports::CatalogStore;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct InMemoryStore {
    groups: RwLock<Vec<Group>>,
    items: Mutex<Vec<Item>>,
    /// When set, every call fails with this message
    failure: RwLock<Option<String>>,
    calls: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(self, id: impl Into<RecordId>, name: &str) -> Self {
        self.groups.write().push(Group {
            id: id.into(),
            name: Some(name.to_string()),
        });
        self
    }

    pub fn with_item(self, item: Item) -> Self {
        self.items.lock().push(item);
        self
    }

    /// Make every subsequent call fail with `message` (None restores service).
    pub fn set_failure(&self, message: Option<&str>) {
        *self.failure.write() = message.map(str::to_string);
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Current count of an item.
    pub fn count(&self, id: &RecordId) -> Option<i64> {
        self.items
            .lock()
            .iter()
            .find(|item| &item.id == id)
            .map(|item| item.count)
    }

    /// Apply a signed delta under the items lock and return the updated row.
    pub fn adjust(&self, id: &RecordId, delta: i64) -> StoreResult<Item> {
        let mut items = self.items.lock();
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or(StoreError::NotFound)?;
        item.count = item.count.checked_add(delta).ok_or_else(|| StoreError::Rejected {
            status: 400,
            code: Some("22003".to_string()),
            message: "integer out of range".to_string(),
        })?;
        Ok(item.clone())
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.failure.read().as_ref() {
            Some(message) => Err(StoreError::Rejected {
                status: 500,
                code: None,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        self.enter()?;
        Ok(self.groups.read().clone())
    }

    async fn list_active_items(&self, group_id: &str) -> StoreResult<Vec<ItemSummary>> {
        self.enter()?;
        Ok(self
            .items
            .lock()
            .iter()
            .filter(|item| item.is_active && item.catalog_group_id.matches_str(group_id))
            .map(Item::summary)
            .collect())
    }

    async fn apply_count_delta(
        &self,
        id: &RecordId,
        delta: CountDelta,
    ) -> StoreResult<serde_json::Value> {
        self.enter()?;
        let updated = self.adjust(id, delta.value())?;
        serde_json::to_value(vec![updated]).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.enter()
    }
}
