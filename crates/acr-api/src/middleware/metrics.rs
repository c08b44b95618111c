//! # Request metrics middleware
//!
//! Counts requests and measures latency per route and status class,
//! exported in Prometheus text format at `/metrics`.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Prometheus collectors for the API, shared via an Axum extension.
#[derive(Clone)]
pub struct ApiMetrics {
    registry: Registry,
    requests: IntCounterVec,
    duration: HistogramVec,
}

impl ApiMetrics {
    /// Create the collectors and register them.
    pub fn new() -> Self {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            Opts::new("acr_requests_total", "API requests by route and status"),
            &["method", "path", "status"],
        )
        .expect("valid metric definition");
        let duration = HistogramVec::new(
            HistogramOpts::new("acr_request_duration_seconds", "API request latency"),
            &["method", "path"],
        )
        .expect("valid metric definition");

        registry
            .register(Box::new(requests.clone()))
            .expect("register requests counter");
        registry
            .register(Box::new(duration.clone()))
            .expect("register duration histogram");

        Self {
            registry,
            requests,
            duration,
        }
    }

    /// Render all collectors in Prometheus text format.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Record one observation per request.
///
/// Uses the matched route template (`/v1/credentials/:id`), not the raw
/// path, so path parameters do not explode label cardinality.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    if let Some(metrics) = metrics {
        let status = response.status().as_u16().to_string();
        metrics
            .requests
            .with_label_values(&[&method, &path, &status])
            .inc();
        metrics
            .duration
            .with_label_values(&[&method, &path])
            .observe(start.elapsed().as_secs_f64());
    }

    response
}
