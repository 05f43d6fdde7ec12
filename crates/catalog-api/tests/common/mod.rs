//! Shared fixtures for the catalog API integration tests.
#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use catalog_api::{CatalogApiService, CatalogStore, InMemoryStore, Item, RecordId, ServiceConfig};
use std::sync::Arc;
use tower::ServiceExt;

pub fn item(id: i64, group: i64, name: &str, active: bool, count: i64) -> Item {
    Item {
        id: RecordId::Int(id),
        name: Some(name.to_string()),
        catalog_group_id: RecordId::Int(group),
        is_active: active,
        count,
    }
}

/// Store with two groups and a handful of items, one of them inactive.
pub fn fixture_store() -> Arc<InMemoryStore> {
    Arc::new(
        InMemoryStore::new()
            .with_group(1i64, "Drinks")
            .with_group(2i64, "Snacks")
            .with_item(item(42, 1, "Cola", true, 5))
            .with_item(item(43, 1, "Lemonade", true, 0))
            .with_item(item(44, 1, "Discontinued Soda", false, 9))
            .with_item(item(50, 2, "Crisps", true, 1)),
    )
}

pub fn app_with(store: Arc<InMemoryStore>) -> Router {
    CatalogApiService::new(ServiceConfig::default(), Some(store as Arc<dyn CatalogStore>))
        .expect("default config is valid")
        .router()
}

pub fn unconfigured_app() -> Router {
    CatalogApiService::new(ServiceConfig::default(), None)
        .expect("default config is valid")
        .router()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|err| panic!("router request failed: {err}"));
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap_or_else(|err| panic!("failed to read response body: {err}"));
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
