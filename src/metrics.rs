//! Prometheus metrics for request tracking and monitoring.
//!
//! This module provides metrics for:
//! - HTTP request counts and latency, labelled by method, route and status
//! - Rate limit rejections
//! - Malformed query rejections

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// Rate limited requests counter metric name.
pub const METRIC_RATE_LIMITED: &str = "rate_limited_requests_total";
/// Malformed query counter metric name.
pub const METRIC_MALFORMED_QUERIES: &str = "malformed_queries_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests served");
    describe_counter!(
        METRIC_RATE_LIMITED,
        "Total number of requests rejected by the rate limiter"
    );
    describe_counter!(
        METRIC_MALFORMED_QUERIES,
        "Total number of requests rejected for a malformed query"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record one served HTTP request.
pub fn record_http_request(start: Instant, method: &str, route: &str, status: u16) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!(METRIC_HTTP_REQUESTS, &labels).increment(1);
    histogram!(METRIC_HTTP_REQUEST_LATENCY, &labels).record(latency_ms);
}

/// Increment rate limited counter.
pub fn inc_rate_limited() {
    counter!(METRIC_RATE_LIMITED).increment(1);
}

/// Increment malformed query counter.
pub fn inc_malformed_queries() {
    counter!(METRIC_MALFORMED_QUERIES).increment(1);
}
