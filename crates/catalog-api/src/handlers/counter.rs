//! Counter endpoints: increase and decrease an item's count by one.
//!
//! The new value is always computed by the store in a single atomic call.
//! Nothing here reads a count.

use super::StoreHandle;
use crate::domain::error::messages;
use crate::domain::{ApiError, ApiResult, CountDelta, CountUpdated, IdRejection, RecordId};
use serde_json::Value;
use tracing::{error, info, instrument};

/// Counter mutation handlers
pub struct CounterHandlers {
    store: StoreHandle,
}

impl CounterHandlers {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// increase - Add one to the count of `{id}`
    ///
    /// The body must be valid JSON.
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn increase(&self, body: &[u8]) -> ApiResult<CountUpdated> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::validation(format!("invalid JSON body: {}", e)))?;
        let id = parse_id(&payload)?;
        self.change_count(&id, CountDelta::Increase).await
    }

    /// decrease - Subtract one from the count of `{id}`
    ///
    /// An absent or malformed body is read as `{}`.
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn decrease(&self, body: &[u8]) -> ApiResult<CountUpdated> {
        let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let id = parse_id(&payload)?;
        self.change_count(&id, CountDelta::Decrease).await
    }

    /// Hand the delta to the store's atomic procedure.
    async fn change_count(&self, id: &RecordId, delta: CountDelta) -> ApiResult<CountUpdated> {
        info!(
            operation = delta.operation(),
            id = %id,
            delta = delta.value(),
            "update_catalog_count called"
        );
        let store = self.store.get()?;

        match store.apply_count_delta(id, delta).await {
            Ok(updated) => {
                info!(id = %id, result = %updated, "update_catalog_count returned");
                Ok(CountUpdated { updated })
            }
            Err(e) => {
                error!(id = %id, error = %e, "update_catalog_count failed");
                Err(e.into())
            }
        }
    }
}

/// Extract the row id from a request payload.
///
/// Anything that is not an object, or an object without a non-null `id`,
/// counts as a missing id.
pub fn parse_id(payload: &Value) -> ApiResult<RecordId> {
    let raw = payload
        .as_object()
        .and_then(|obj| obj.get("id"))
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::validation(messages::ID_REQUIRED))?;

    match raw {
        Value::String(s) if s.is_empty() => Err(ApiError::validation(messages::ID_REQUIRED)),
        other => RecordId::from_json(other).map_err(|rejection| match rejection {
            IdRejection::WrongType => ApiError::validation(messages::ID_INVALID),
            IdRejection::OutOfRange => ApiError::validation(messages::ID_OUT_OF_RANGE),
        }),
    }
}
