//! Metrics collection and Prometheus export.

use metrics::counter;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder, or the reason installing it failed.
static METRICS_HANDLE: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Install the Prometheus recorder. Later calls return the first outcome,
/// so building several routers in one process is fine.
pub fn init_metrics() -> Result<(), anyhow::Error> {
    METRICS_HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new()
                .set_buckets_for_metric(
                    Matcher::Full("http_request_duration_seconds".to_string()),
                    DURATION_BUCKETS,
                )
                .and_then(|builder| builder.install_recorder())
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    match METRICS_HANDLE.get() {
        Some(Ok(handle)) => handle.render(),
        _ => "# Metrics recorder not initialized\n".to_string(),
    }
}

/// Count an authentication event, e.g. `("login", "failure")`.
pub fn record_auth_event(event: &'static str, outcome: &'static str) {
    counter!("auth_events_total", "event" => event, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent_and_exports_auth_events() {
        init_metrics().unwrap();
        init_metrics().unwrap();

        record_auth_event("login", "success");

        let body = get_metrics();
        assert!(body.contains("auth_events_total"));
        assert!(body.contains("event=\"login\""));
    }
}
