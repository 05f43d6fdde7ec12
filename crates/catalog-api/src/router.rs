use crate::domain::{ApiResult, HealthStatus, SubGroupQuery};
use crate::handlers::Handlers;
use crate::middleware::{RequestTimer, ServiceMetrics};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub handlers: Arc<Handlers>,
    pub metrics: Arc<ServiceMetrics>,
}

/// Route table. Paths match the deployed API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/get_group", get(get_group))
        .route("/get_sub_group", get(get_sub_group))
        .route("/increase", post(increase))
        .route("/decrease", post(decrease))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
}

async fn get_group(State(state): State<AppState>) -> Response {
    let timer = RequestTimer::new(Arc::clone(&state.metrics), false);
    respond(timer, state.handlers.catalog.list_groups().await)
}

/// A query string that fails to decode is treated like a missing `group_id`.
async fn get_sub_group(
    State(state): State<AppState>,
    query: Option<Query<Vec<(String, String)>>>,
) -> Response {
    let timer = RequestTimer::new(Arc::clone(&state.metrics), false);
    let group_id = query.and_then(|Query(pairs)| SubGroupQuery::from_pairs(pairs).group_id);
    respond(
        timer,
        state
            .handlers
            .catalog
            .list_active_items(group_id.as_deref())
            .await,
    )
}

async fn increase(State(state): State<AppState>, body: Bytes) -> Response {
    let timer = RequestTimer::new(Arc::clone(&state.metrics), true);
    respond(timer, state.handlers.counter.increase(&body).await)
}

async fn decrease(State(state): State<AppState>, body: Bytes) -> Response {
    let timer = RequestTimer::new(Arc::clone(&state.metrics), true);
    respond(timer, state.handlers.counter.decrease(&body).await)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: crate::VERSION,
        store_configured: state.handlers.store_configured(),
    })
}

async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.metrics.to_json())
}

/// Record the request and render the result: 200 with the JSON payload, or
/// the error's status with `{"error": ...}`.
fn respond<T: Serialize>(timer: RequestTimer, result: ApiResult<T>) -> Response {
    let response = match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => e.into_response(),
    };
    timer.finish(response.status());
    response
}
