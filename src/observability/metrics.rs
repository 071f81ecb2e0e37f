//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webhook_requests_total` (counter): handled requests by route
//! - `webhook_rate_limited_total` (counter): 429 rejections
//! - `webhook_unauthorized_total` (counter): 401 rejections
//! - `webhook_alerts_total` (counter): received alerts by status
//! - `webhook_notification_failures_total` (counter): failed sound playback
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str) {
    counter!("webhook_requests_total", "route" => route).increment(1);
}

pub fn record_rate_limited() {
    counter!("webhook_rate_limited_total").increment(1);
}

pub fn record_unauthorized() {
    counter!("webhook_unauthorized_total").increment(1);
}

/// Count an alert. Caller-supplied statuses fold into a fixed label set.
pub fn record_alert(status: Option<&str>) {
    counter!("webhook_alerts_total", "status" => alert_status_label(status)).increment(1);
}

fn alert_status_label(status: Option<&str>) -> &'static str {
    match status {
        Some("firing") => "firing",
        Some("resolved") => "resolved",
        Some(_) => "other",
        None => "none",
    }
}

pub fn record_notification_failure() {
    counter!("webhook_notification_failures_total").increment(1);
}
