//! Request metrics.
//!
//! Counters per response class and per route kind, exported as JSON at
//! `GET /metrics`. Only the catalog routes are recorded.

use axum::http::StatusCode;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Default)]
pub struct ServiceMetrics {
    reads: AtomicU64,
    writes: AtomicU64,
    ok: AtomicU64,
    client_errors: AtomicU64,
    not_found: AtomicU64,
    server_errors: AtomicU64,
    latency_total_ms: AtomicU64,
    latency_max_ms: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total: u64,
    pub reads: u64,
    pub writes: u64,
    pub success: u64,
    pub error: u64,
    pub client_errors: u64,
    pub not_found: u64,
    pub server_errors: u64,
    pub average_latency_ms: f64,
    pub max_latency_ms: u64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished request by route kind and response status.
    pub fn record(&self, is_write: bool, status: StatusCode, latency_ms: u64) {
        let kind = if is_write { &self.writes } else { &self.reads };
        kind.fetch_add(1, Ordering::Relaxed);

        let class = match status {
            s if s.is_success() => &self.ok,
            s if s == StatusCode::NOT_FOUND => &self.not_found,
            s if s.is_client_error() => &self.client_errors,
            _ => &self.server_errors,
        };
        class.fetch_add(1, Ordering::Relaxed);

        self.latency_total_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.latency_max_ms.fetch_max(latency_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        let total = load(&self.reads) + load(&self.writes);
        let success = load(&self.ok);
        MetricsSnapshot {
            total,
            reads: load(&self.reads),
            writes: load(&self.writes),
            success,
            error: total.saturating_sub(success),
            client_errors: load(&self.client_errors),
            not_found: load(&self.not_found),
            server_errors: load(&self.server_errors),
            average_latency_ms: if total == 0 {
                0.0
            } else {
                load(&self.latency_total_ms) as f64 / total as f64
            },
            max_latency_ms: load(&self.latency_max_ms),
        }
    }

    /// Body of `GET /metrics`.
    pub fn to_json(&self) -> serde_json::Value {
        let s = self.snapshot();
        serde_json::json!({
            "requests": {
                "total": s.total,
                "reads": s.reads,
                "writes": s.writes,
                "success": s.success,
                "error": s.error,
            },
            "errors": {
                "validation": s.client_errors,
                "not_found": s.not_found,
                "server": s.server_errors,
            },
            "latency": {
                "average_ms": s.average_latency_ms,
                "max_ms": s.max_latency_ms,
            }
        })
    }
}

/// Started when a route handler is entered, finished with the final status.
pub struct RequestTimer {
    started: Instant,
    metrics: Arc<ServiceMetrics>,
    is_write: bool,
}

impl RequestTimer {
    pub fn new(metrics: Arc<ServiceMetrics>, is_write: bool) -> Self {
        Self {
            started: Instant::now(),
            metrics,
            is_write,
        }
    }

    pub fn finish(self, status: StatusCode) {
        let latency_ms = self.started.elapsed().as_millis() as u64;
        self.metrics.record(self.is_write, status, latency_ms);
    }
}
