//! Catalog API - HTTP facade over a hosted catalog database.
//!
//! Lists catalog groups and the active items of a group, and moves a
//! per-item counter up or down by one. Every request is a single call to a
//! PostgREST endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        CATALOG API                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  GET /get_group   GET /get_sub_group                         │
//! │  POST /increase   POST /decrease      GET /health /metrics   │
//! │         │                                                    │
//! │  ┌──────┴────────────────────────────────┐                   │
//! │  │  Middleware: Cors → Tracing → Limit   │                   │
//! │  └──────┬────────────────────────────────┘                   │
//! │         │                                                    │
//! │  ┌──────┴──────────────┐   ┌─────────────────────────────┐   │
//! │  │ CatalogHandlers     │   │ CounterHandlers             │   │
//! │  │ (table selects)     │   │ (atomic delta procedure)    │   │
//! │  └──────┬──────────────┘   └──────────────┬──────────────┘   │
//! │         └──────────────┬──────────────────┘                  │
//! │                 CatalogStore port                            │
//! └────────────────────────┼─────────────────────────────────────┘
//!                          │
//!          PostgrestStore (HTTPS) │ InMemoryStore (tests)
//! ```
//!
//! # Counter atomicity
//!
//! Counts are never read and written back by this service. The store's
//! `update_catalog_count(var_catalog_id, delta)` procedure applies the delta
//! in one statement, so concurrent callers cannot lose updates.
//!
//! # Usage
//!
//! ```ignore
//! use catalog_api::{CatalogApiService, ServiceConfig};
//!
//! let service = CatalogApiService::from_config(ServiceConfig::from_env())?;
//! service.start(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod router;
pub mod service;

// Re-exports for public API
pub use adapters::{InMemoryStore, PostgrestStore};
pub use domain::config::{ServiceConfig, StoreConfig};
pub use domain::error::{ApiError, ApiResult, ServiceError, StoreError, StoreResult};
pub use domain::types::*;
pub use middleware::ServiceMetrics;
pub use ports::CatalogStore;
pub use service::CatalogApiService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
