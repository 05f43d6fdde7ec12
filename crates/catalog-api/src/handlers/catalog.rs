//! Read-only catalog endpoints: groups and the active items of a group.

use super::StoreHandle;
use crate::domain::error::messages;
use crate::domain::{ApiError, ApiResult, Group, ItemSummary};
use tracing::{error, info, instrument};

/// Catalog read handlers
pub struct CatalogHandlers {
    store: StoreHandle,
}

impl CatalogHandlers {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// get_group - All groups as `{id, name}`
    #[instrument(skip(self))]
    pub async fn list_groups(&self) -> ApiResult<Vec<Group>> {
        let store = self.store.get()?;
        let groups = store.list_groups().await.map_err(|e| {
            error!(error = %e, "get_group failed");
            ApiError::from(e)
        })?;
        info!(rows = groups.len(), "get_group returning rows");
        Ok(groups)
    }

    /// get_sub_group - Active items of one group as `{id, name}`
    ///
    /// A missing or empty `group_id` is rejected before the store is
    /// consulted, configured or not.
    #[instrument(skip(self))]
    pub async fn list_active_items(&self, group_id: Option<&str>) -> ApiResult<Vec<ItemSummary>> {
        let group_id = group_id
            .filter(|g| !g.is_empty())
            .ok_or_else(|| ApiError::validation(messages::GROUP_ID_REQUIRED))?;

        let store = self.store.get()?;
        let items = store.list_active_items(group_id).await.map_err(|e| {
            error!(error = %e, group_id, "get_sub_group failed");
            ApiError::from(e)
        })?;
        info!(rows = items.len(), group_id, "get_sub_group returning rows");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::{Item, RecordId};
    use axum::http::StatusCode;
    use std::sync::Arc;

    fn handlers(store: Arc<InMemoryStore>) -> CatalogHandlers {
        CatalogHandlers::new(StoreHandle::configured(store))
    }

    #[tokio::test]
    async fn test_missing_group_id_skips_store() {
        let store = Arc::new(InMemoryStore::new());
        let h = handlers(Arc::clone(&store));

        for group_id in [None, Some("")] {
            let err = h.list_active_items(group_id).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.message, "group_id is required");
        }
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_configuration() {
        let h = CatalogHandlers::new(StoreHandle::unconfigured());
        let err = h.list_active_items(None).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = h.list_active_items(Some("1")).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_active_items_of_group() {
        let store = InMemoryStore::new()
            .with_item(Item {
                id: RecordId::Int(1),
                name: Some("Cola".into()),
                catalog_group_id: RecordId::Int(5),
                is_active: true,
                count: 0,
            })
            .with_item(Item {
                id: RecordId::Int(2),
                name: Some("Retired".into()),
                catalog_group_id: RecordId::Int(5),
                is_active: false,
                count: 0,
            });
        let h = handlers(Arc::new(store));

        let items = h.list_active_items(Some("5")).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name.as_deref(), Some("Cola"));
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let store = Arc::new(InMemoryStore::new());
        store.set_failure(Some("relation \"catalog_group\" does not exist"));
        let err = handlers(store).list_groups().await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("catalog_group"));
    }
}
