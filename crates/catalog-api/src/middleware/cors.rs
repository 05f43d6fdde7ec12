//! CORS for browser clients of the catalog routes.

use crate::domain::config::CorsConfig;
use crate::domain::correlation::REQUEST_ID_HEADER;
use axum::http::{header, HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// Build the CORS layer. A disabled config yields a layer that adds no
/// headers, so only same-origin callers succeed from a browser.
pub fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(allowed_origins(config))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(config.max_age_secs))
}

fn allowed_origins(config: &CorsConfig) -> AllowOrigin {
    if config.allows_any_origin() {
        return AllowOrigin::any();
    }
    let origins = config.allowed_origins.iter().filter_map(|origin| {
        HeaderValue::from_str(origin)
            .map_err(|_| warn!(origin = %origin, "ignoring unusable CORS origin"))
            .ok()
    });
    AllowOrigin::list(origins)
}
