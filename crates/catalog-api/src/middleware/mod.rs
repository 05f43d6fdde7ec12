//! Middleware stack for the catalog API.
//!
//! Layer order: Request → Cors → Tracing → BodyLimit → Handler

pub mod cors;
pub mod metrics;
pub mod tracing;

pub use cors::create_cors_layer;
pub use metrics::{MetricsSnapshot, RequestTimer, ServiceMetrics};
pub use tracing::TracingLayer;
