//! PostgREST client against a local fake of the REST endpoint.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use catalog_api::{
    CatalogApiService, CatalogStore, CountDelta, PostgrestStore, RecordId, ServiceConfig,
    StoreConfig, StoreError,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const KEY: &str = "service-role-key";

/// One request as seen by the fake endpoint.
#[derive(Debug, Clone)]
struct Seen {
    path: String,
    query: HashMap<String, String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct Fake {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Fake {
    fn requests(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }
}

fn unauthorized(headers: &HeaderMap) -> Option<Response> {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
    if apikey == Some(KEY) && bearer == Some(format!("Bearer {}", KEY).as_str()) {
        return None;
    }
    Some(
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key", "hint": "Double check your key"})),
        )
            .into_response(),
    )
}

async fn groups(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    fake.seen.lock().push(Seen {
        path: "catalog_group".into(),
        query,
        body: None,
    });
    Json(json!([
        {"id": 1, "name": "Drinks"},
        {"id": 2, "name": null}
    ]))
    .into_response()
}

async fn items(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    let rows = match query.get("catalog_group_id").map(String::as_str) {
        Some("eq.1") => json!([{"id": 42, "name": "Cola"}, {"id": 43, "name": "Lemonade"}]),
        _ => json!([]),
    };
    fake.seen.lock().push(Seen {
        path: "catalog".into(),
        query,
        body: None,
    });
    Json(rows).into_response()
}

async fn update_count(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Json(args): Json<Value>,
) -> Response {
    if let Some(denied) = unauthorized(&headers) {
        return denied;
    }
    fake.seen.lock().push(Seen {
        path: "rpc/update_catalog_count".into(),
        query: HashMap::new(),
        body: Some(args.clone()),
    });

    let delta = args["delta"].as_i64().unwrap_or_default();
    match &args["var_catalog_id"] {
        Value::Number(n) if n.as_i64() == Some(42) => {
            Json(json!([{"id": 42, "name": "Cola", "count": 5 + delta}])).into_response()
        }
        Value::String(s) if s == "sku-7" => {
            Json(json!([{"id": "sku-7", "count": 1 + delta}])).into_response()
        }
        Value::Number(n) if n.as_i64() == Some(13) => Json(json!([])).into_response(),
        Value::Number(n) if n.as_i64() == Some(204) => StatusCode::NO_CONTENT.into_response(),
        Value::Number(n) if n.as_i64() == Some(500) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "code": "XX000",
                "message": "could not serialize access",
                "details": null,
                "hint": null
            })),
        )
            .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "code": "P0001",
                "message": "not_found",
                "details": null,
                "hint": null
            })),
        )
            .into_response(),
    }
}

async fn spawn_fake() -> (SocketAddr, Fake) {
    let fake = Fake::default();
    let app = Router::new()
        .route("/rest/v1/catalog_group", get(groups))
        .route("/rest/v1/catalog", get(items))
        .route("/rest/v1/rpc/update_catalog_count", post(update_count))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, fake)
}

fn store_for(addr: SocketAddr, key: &str) -> PostgrestStore {
    // Trailing slash is trimmed by the config
    PostgrestStore::new(&StoreConfig::new(format!("http://{}/", addr), key)).unwrap()
}

#[tokio::test]
async fn list_groups_selects_id_and_name() {
    let (addr, fake) = spawn_fake().await;
    let store = store_for(addr, KEY);

    let groups = store.list_groups().await.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].id, RecordId::Int(1));
    assert_eq!(groups[0].name.as_deref(), Some("Drinks"));
    assert_eq!(groups[1].name, None);

    let seen = fake.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].query.get("select").map(String::as_str), Some("id,name"));
}

#[tokio::test]
async fn list_active_items_filters_by_group_and_active() {
    let (addr, fake) = spawn_fake().await;
    let store = store_for(addr, KEY);

    let items = store.list_active_items("1").await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, RecordId::Int(42));

    assert!(store.list_active_items("7").await.unwrap().is_empty());

    let query = &fake.requests()[0].query;
    assert_eq!(query.get("catalog_group_id").map(String::as_str), Some("eq.1"));
    assert_eq!(query.get("is_active").map(String::as_str), Some("eq.true"));
    assert_eq!(query.get("select").map(String::as_str), Some("id,name"));
}

#[tokio::test]
async fn count_delta_calls_procedure_with_named_args() {
    let (addr, fake) = spawn_fake().await;
    let store = store_for(addr, KEY);

    let updated = store
        .apply_count_delta(&RecordId::Int(42), CountDelta::Increase)
        .await
        .unwrap();
    assert_eq!(updated[0]["count"], 6);

    let updated = store
        .apply_count_delta(&RecordId::from("sku-7"), CountDelta::Decrease)
        .await
        .unwrap();
    assert_eq!(updated[0]["count"], 0);

    let bodies: Vec<Value> = fake.requests().into_iter().filter_map(|s| s.body).collect();
    assert_eq!(
        bodies,
        vec![
            json!({"var_catalog_id": 42, "delta": 1}),
            json!({"var_catalog_id": "sku-7", "delta": -1}),
        ]
    );
}

#[tokio::test]
async fn count_delta_not_found_variants() {
    let (addr, _fake) = spawn_fake().await;
    let store = store_for(addr, KEY);

    // Raised exception
    let err = store
        .apply_count_delta(&RecordId::Int(9999), CountDelta::Increase)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound);

    // Empty result set
    let err = store
        .apply_count_delta(&RecordId::Int(13), CountDelta::Decrease)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound);

    // No body at all
    let err = store
        .apply_count_delta(&RecordId::Int(204), CountDelta::Increase)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound);
}

#[tokio::test]
async fn store_errors_carry_store_message() {
    let (addr, _fake) = spawn_fake().await;

    let err = store_for(addr, KEY)
        .apply_count_delta(&RecordId::Int(500), CountDelta::Increase)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::Rejected {
            status: 500,
            code: Some("XX000".into()),
            message: "could not serialize access".into(),
        }
    );

    let err = store_for(addr, "wrong-key").list_groups().await.unwrap_err();
    assert!(matches!(err, StoreError::Rejected { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid API key");
}

#[tokio::test]
async fn unreachable_store_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = store_for(addr, KEY);
    let err = store.list_groups().await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)), "{:?}", err);
    assert!(store.ping().await.is_err());
}

#[tokio::test]
async fn startup_check_pings_store_when_enabled() {
    let (store_addr, fake) = spawn_fake().await;

    let config = ServiceConfig::from_lookup(|key| match key {
        "SUPABASE_URL" => Some(format!("http://{}", store_addr)),
        "SUPABASE_KEY" => Some(KEY.to_string()),
        "STORE_HEALTH_CHECK" => Some("true".to_string()),
        _ => None,
    });
    let service = CatalogApiService::from_config(config).unwrap();
    service.startup_health_check().await;

    let seen = fake.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "catalog_group");
    assert_eq!(seen[0].query.get("limit").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn service_end_to_end_over_http() {
    let (store_addr, fake) = spawn_fake().await;

    let config = ServiceConfig::from_lookup(|key| match key {
        "SUPABASE_URL" => Some(format!("http://{}", store_addr)),
        "SUPABASE_KEY" => Some(KEY.to_string()),
        _ => None,
    });
    assert!(config.store_configured());
    let service = CatalogApiService::from_config(config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        service
            .serve(listener, async move {
                let _ = stop_rx.await;
            })
            .await
    });

    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let response = client
        .get(format!("{}/get_group", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([{"id": 1, "name": "Drinks"}, {"id": 2, "name": null}]));

    let response = client
        .post(format!("{}/increase", base))
        .json(&json!({"id": 42}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["updated"][0]["count"], 6);

    let response = client
        .post(format!("{}/decrease", base))
        .json(&json!({"id": 9999}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "row not found"}));

    let response = client
        .post(format!("{}/increase", base))
        .json(&json!({"id": 500}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "could not serialize access"}));

    assert_eq!(fake.requests().len(), 4);

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
