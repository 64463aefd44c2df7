//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cors_decisions_total` (counter): decisions by outcome
//!   (`allowed`, `denied`, `skipped`)
//! - `cors_config_reloads_total` (counter): rule set reloads by result
//!   (`applied`, `rejected`)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(outcome: &'static str) {
    metrics::counter!("cors_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_reload(applied: bool) {
    let result = if applied { "applied" } else { "rejected" };
    metrics::counter!("cors_config_reloads_total", "result" => result).increment(1);
}
