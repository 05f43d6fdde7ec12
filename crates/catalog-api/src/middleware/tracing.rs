//! Request tracing.
//!
//! Every request runs inside an `http_request` span carrying its method,
//! path and request id. The id is echoed back in `x-request-id`; an inbound
//! W3C `traceparent` contributes its trace id to the span.

use crate::domain::correlation::{RequestId, REQUEST_ID_HEADER};
use axum::{
    body::Body,
    http::{HeaderValue, Request},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{field, info, info_span, warn, Instrument, Span};

#[derive(Clone, Copy, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Take the clone that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let (span, request_id) = request_span(&req);

        Box::pin(
            async move {
                let started = Instant::now();
                let mut response = match inner.call(req).await {
                    Ok(response) => response,
                    Err(e) => return Err(e),
                };

                let status = response.status();
                Span::current().record("status", status.as_u16());
                if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }

                let latency_ms = started.elapsed().as_millis() as u64;
                if status.is_server_error() {
                    warn!(status = status.as_u16(), latency_ms, "request failed");
                } else {
                    info!(status = status.as_u16(), latency_ms, "request completed");
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}

fn request_span<B>(req: &Request<B>) -> (Span, RequestId) {
    let request_id = RequestId::from_header(
        req.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );

    let span = info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
        trace_id = field::Empty,
        status = field::Empty,
    );
    if let Some(trace_id) = trace_id(req) {
        span.record("trace_id", trace_id);
    }
    (span, request_id)
}

/// Trace id of a `traceparent` header (`version-trace_id-parent_id-flags`).
fn trace_id<B>(req: &Request<B>) -> Option<&str> {
    let header = req.headers().get("traceparent")?.to_str().ok()?;
    let mut parts = header.split('-');
    let (_version, trace_id, _parent, _flags) =
        (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || trace_id.len() != 32 {
        return None;
    }
    trace_id
        .bytes()
        .all(|b| b.is_ascii_hexdigit())
        .then_some(trace_id)
}
