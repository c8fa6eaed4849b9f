use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Label set attached to a metric event. Ordered so that every backend sees
/// the labels in the same sequence.
pub type Labels = BTreeMap<String, String>;

/// The three metric shapes the emission policy produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        };
        f.write_str(name)
    }
}

/// A single metric observation handed to a sink. Emitted, never stored by
/// the emitter; aggregation belongs to the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEvent {
    pub name: String,
    pub kind: MetricKind,
    pub value: f64,
    pub labels: Labels,
}

impl MetricEvent {
    // ---

    /// Counter increment by one.
    pub fn counter(name: impl Into<String>, labels: Labels) -> Self {
        Self {
            name: name.into(),
            kind: MetricKind::Counter,
            value: 1.0,
            labels,
        }
    }

    pub fn gauge(name: impl Into<String>, value: f64, labels: Labels) -> Self {
        Self {
            name: name.into(),
            kind: MetricKind::Gauge,
            value,
            labels,
        }
    }

    pub fn histogram(name: impl Into<String>, value: f64, labels: Labels) -> Self {
        Self {
            name: name.into(),
            kind: MetricKind::Histogram,
            value,
            labels,
        }
    }

    /// Convenience accessor used by tests and log lines.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Destination for metric events (Prometheus exposition, DogStatsD, no-op...).
///
/// Implementations must tolerate concurrent emission from many in-flight
/// requests. Emission is fire-and-forget: an `Err` is logged by the caller
/// and the event is dropped.
pub trait MetricsSink: Send + Sync + 'static {
    // ---
    /// Forward one event to the backend.
    fn emit(&self, event: &MetricEvent) -> Result<()>;

    /// Render current metrics in Prometheus text format. Push-based sinks
    /// return an empty string.
    fn render(&self) -> String;
}

/// Type alias for any backend that implements MetricsSink.
pub type MetricsPtr = Arc<dyn MetricsSink>;
