//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): catch-all requests by method, status, mode
//! - `proxy_request_duration_seconds` (histogram): catch-all latency by mode
//! - `proxy_upstream_updates_total` (counter): control endpoint updates by source
//! - `proxy_upstream_health` (gauge): 1=healthy, 0=unhealthy, from the last probe
//! - `proxy_health_checks_total` (counter): `/health` probes by outcome
//!
//! Recording is a no-op until an exporter is installed.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::config::ProxyMode;
use crate::health::HealthProbe;

/// Install the Prometheus exporter with its own HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, mode: ProxyMode, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "mode" => mode.as_str()
    )
    .increment(1);

    histogram!("proxy_request_duration_seconds", "mode" => mode.as_str())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_update(source: &str) {
    counter!("proxy_upstream_updates_total", "source" => source.to_string()).increment(1);
}

pub fn record_upstream_health(outcome: &HealthProbe) {
    gauge!("proxy_upstream_health").set(if outcome.is_healthy() { 1.0 } else { 0.0 });
    counter!("proxy_health_checks_total", "outcome" => outcome.label()).increment(1);
}
