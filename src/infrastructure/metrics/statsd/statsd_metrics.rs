//! DogStatsD metrics sink.
//!
//! Events go through the same `metrics` facade path as the Prometheus sink;
//! the exporter aggregates them and a background forwarder pushes the
//! datagrams over UDP. Nothing on the request path touches the network.

use crate::domain::{MetricEvent, MetricsSink};
use crate::infrastructure::metrics::record_event;
use anyhow::Result;
use metrics_exporter_dogstatsd::DogStatsDRecorder;

/// DogStatsD-backed sink (push model).
pub struct StatsdMetrics {
    recorder: DogStatsDRecorder,
}

impl StatsdMetrics {
    pub fn new(recorder: DogStatsDRecorder) -> Self {
        tracing::info!("Creating DogStatsD metrics");
        StatsdMetrics { recorder }
    }
}

impl MetricsSink for StatsdMetrics {
    fn emit(&self, event: &MetricEvent) -> Result<()> {
        record_event(&self.recorder, event);
        Ok(())
    }

    /// Push sink: there is nothing to scrape.
    fn render(&self) -> String {
        String::new()
    }
}
