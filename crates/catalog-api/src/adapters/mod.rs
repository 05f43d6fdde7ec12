//! Adapters for the catalog API.
//!
//! Implementations of the `CatalogStore` port.

pub mod error_conversions;
pub mod memory;
pub mod postgrest;

pub use memory::InMemoryStore;
pub use postgrest::PostgrestStore;
