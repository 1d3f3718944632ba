//! Metrics collection and exposition.
//!
//! # Metrics
//! - `todo_api_requests_total` (counter): requests by method, route, status
//! - `todo_api_request_duration_seconds` (histogram): latency by method, route
//! - `todo_api_privilege_denied_total` (counter): gate rejections by
//!   capability and reason
//!
//! Recording is a no-op until a recorder is installed, so handlers and tests
//! can run without the exporter.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "todo_api_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "todo_api_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_privilege_denied(capability: &'static str, reason: &'static str) {
    metrics::counter!(
        "todo_api_privilege_denied_total",
        "capability" => capability,
        "reason" => reason
    )
    .increment(1);
}

/// Middleware recording request count and latency per matched route.
pub async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
