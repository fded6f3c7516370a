//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides the /metrics endpoint handler.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Must run once at startup, before any metric is recorded; metrics
/// recorded earlier are dropped.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("metrics handle already initialized"))
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}
