//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_upstream_requests_total` (counter): outbound calls by outcome
//! - `gateway_upstream_duration_seconds` (histogram): outbound latency
//! - `gateway_preview_updates_total` (counter): updates by result
//!
//! # Design Decisions
//! - Recording is always on; without an installed exporter it costs nothing
//! - Labels are low-cardinality: route names, not raw paths

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream(outcome: &'static str, start: Instant) {
    ::metrics::counter!("gateway_upstream_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("gateway_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_preview_update(result: &'static str) {
    ::metrics::counter!("gateway_preview_updates_total", "result" => result).increment(1);
}
