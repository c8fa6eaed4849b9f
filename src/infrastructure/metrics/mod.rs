pub mod memory;
pub mod noop;
pub mod prometheus;
mod recording;
pub mod statsd;

use crate::config::{MetricsBackend, MetricsConfig};
use crate::domain::MetricsPtr;
use crate::lifecycle::MetricNames;

pub(crate) use recording::record_event;

// Re-export the factory functions for easy access
pub use memory::{create as create_memory_metrics, MemoryMetrics};
pub use noop::create as create_noop_metrics;
pub use prometheus::create as create_prom_metrics;
pub use statsd::create as create_statsd_metrics;

/// Build the sink selected by `config.backend` together with the metric
/// names that backend expects.
pub fn create_metrics(config: &MetricsConfig) -> anyhow::Result<(MetricsPtr, MetricNames)> {
    // ---
    let created = match config.backend {
        MetricsBackend::Prometheus => (create_prom_metrics()?, MetricNames::prometheus()),
        MetricsBackend::Statsd => (
            create_statsd_metrics(&config.statsd_host, config.statsd_port)?,
            MetricNames::statsd(),
        ),
        MetricsBackend::Noop => (create_noop_metrics()?, MetricNames::prometheus()),
    };

    tracing::info!(backend = %config.backend, "Metrics sink ready");
    Ok(created)
}
