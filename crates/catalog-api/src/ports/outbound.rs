//! Outbound ports for the catalog API.

use crate::domain::{CountDelta, Group, ItemSummary, RecordId, StoreResult};
use async_trait::async_trait;

/// Remote data store holding `catalog_group` and `catalog`.
///
/// Every method is exactly one remote call. Implementations must apply
/// counter deltas atomically on the store side; callers never read a count
/// and write it back.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All groups, projected to `id,name`.
    async fn list_groups(&self) -> StoreResult<Vec<Group>>;

    /// Active items whose `catalog_group_id` equals `group_id`, projected to
    /// `id,name`.
    async fn list_active_items(&self, group_id: &str) -> StoreResult<Vec<ItemSummary>>;

    /// Add `delta` to the item's count in one indivisible store operation.
    ///
    /// Returns the raw result of the operation (the updated rows), or
    /// `StoreError::NotFound` when no row has this id.
    async fn apply_count_delta(
        &self,
        id: &RecordId,
        delta: CountDelta,
    ) -> StoreResult<serde_json::Value>;

    /// Cheap reachability probe used by the startup health check.
    async fn ping(&self) -> StoreResult<()>;
}
