//! Metrics collection and exposition.
//!
//! # Metrics
//! - `host_selection_total` (counter): selections by reason
//!   (`req`, `cookie`, `header`, `caller`, `random`)
//! - `host_selection_empty_total` (counter): requests with no allowed host
//! - `caller_registry_reloads_total` (counter): reloads by result
//! - `caller_registry_rules` (gauge): rules in the live registry
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::selection::SelectionReason;

/// Start the Prometheus scrape endpoint. Needs a running tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_selection(reason: SelectionReason) {
    metrics::counter!("host_selection_total", "reason" => reason.as_str()).increment(1);
}

pub fn record_empty_selection() {
    metrics::counter!("host_selection_empty_total").increment(1);
}

pub fn record_reload(success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("caller_registry_reloads_total", "result" => result).increment(1);
}

pub fn record_registry_size(rules: usize) {
    metrics::gauge!("caller_registry_rules").set(rules as f64);
}
