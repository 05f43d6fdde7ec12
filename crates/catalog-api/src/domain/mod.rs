//! Domain types for the catalog API.
//!
//! Configuration, errors and the row types read from the store.

pub mod config;
pub mod correlation;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::{ConfigError, ServiceConfig, StoreConfig};
pub use correlation::RequestId;
pub use error::{ApiError, ApiResult, ServiceError, StoreError, StoreResult};
pub use types::*;
