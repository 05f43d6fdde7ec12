//! Ports for the catalog API.

pub mod outbound;

pub use outbound::CatalogStore;
