//! Prometheus metrics sink.
//!
//! Events are recorded through the `metrics` facade against a recorder owned
//! by this struct (`metrics::with_local_recorder`), never the process-wide
//! global one. The matching handle renders the text exposition served by
//! the `/metrics` route.

use crate::domain::{MetricEvent, MetricsSink};
use crate::infrastructure::metrics::record_event;
use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusHandle, PrometheusRecorder};

/// Prometheus-backed sink (pull model).
pub struct PrometheusMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl PrometheusMetrics {
    pub fn new(recorder: PrometheusRecorder) -> Self {
        tracing::info!("Creating Prometheus metrics");
        let handle = recorder.handle();
        PrometheusMetrics { recorder, handle }
    }
}

impl MetricsSink for PrometheusMetrics {
    fn emit(&self, event: &MetricEvent) -> Result<()> {
        record_event(&self.recorder, event);
        Ok(())
    }

    fn render(&self) -> String {
        self.handle.render()
    }
}
