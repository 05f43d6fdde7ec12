//! Request handlers for the catalog API.
//!
//! One handler struct per resource. Each operation validates its input,
//! makes at most one store call and maps the outcome to an `ApiResult`.

pub mod catalog;
pub mod counter;

pub use catalog::CatalogHandlers;
pub use counter::CounterHandlers;

use crate::domain::{ApiError, ApiResult};
use crate::ports::CatalogStore;
use std::sync::Arc;

/// Store client as seen by the handlers.
///
/// Empty when the connection settings were missing at startup. Handlers
/// check it after validating input and before any store call.
#[derive(Clone, Default)]
pub struct StoreHandle(Option<Arc<dyn CatalogStore>>);

impl StoreHandle {
    pub fn new(store: Option<Arc<dyn CatalogStore>>) -> Self {
        Self(store)
    }

    pub fn configured(store: Arc<dyn CatalogStore>) -> Self {
        Self(Some(store))
    }

    pub fn unconfigured() -> Self {
        Self(None)
    }

    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    /// The store client, or the configuration error callers receive.
    pub fn get(&self) -> ApiResult<&dyn CatalogStore> {
        self.0.as_deref().ok_or_else(ApiError::configuration)
    }
}

/// All handlers, shared by the router.
pub struct Handlers {
    pub catalog: CatalogHandlers,
    pub counter: CounterHandlers,
    store: StoreHandle,
}

impl Handlers {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            catalog: CatalogHandlers::new(store.clone()),
            counter: CounterHandlers::new(store.clone()),
            store,
        }
    }

    pub fn store_configured(&self) -> bool {
        self.store.is_configured()
    }
}
