mod prometheus_metrics;
mod recorder;

pub use prometheus_metrics::PrometheusMetrics;
use std::sync::Arc;

// Re-export utilities for internal use within this module
pub(crate) use recorder::build_recorder;

/// Creates a new Prometheus metrics sink.
///
/// Each call builds its own recorder and handle, so several sinks (one per
/// test, for instance) never share a registry. Metrics are exposed through
/// the `/metrics` route rather than a separate listener.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");

    Ok(Arc::new(PrometheusMetrics::new(build_recorder()?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Labels, MetricEvent};

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_create_returns_valid_metrics() {
        let result = create();
        assert!(result.is_ok());
    }

    #[test]
    fn counters_gauges_and_histograms_render() {
        let sink = create().unwrap();
        let request = labels(&[("endpoint", "/delay"), ("method", "GET"), ("status", "200")]);

        sink.emit(&MetricEvent::counter("http_requests_total", request.clone()))
            .unwrap();
        sink.emit(&MetricEvent::counter("http_requests_total", request.clone()))
            .unwrap();
        sink.emit(&MetricEvent::gauge(
            "memory_usage_bytes",
            5242880.0,
            labels(&[("operation", "memory_allocation")]),
        ))
        .unwrap();
        sink.emit(&MetricEvent::histogram(
            "http_request_duration_seconds",
            0.2,
            request,
        ))
        .unwrap();

        let body = sink.render();
        assert!(body.contains("http_requests_total{"), "{body}");
        assert!(body.contains("endpoint=\"/delay\""), "{body}");
        assert!(body.contains("memory_usage_bytes{operation=\"memory_allocation\"} 5242880"), "{body}");
        assert!(body.contains("http_request_duration_seconds_bucket"), "{body}");
        assert!(body
            .lines()
            .any(|line| line.starts_with("http_requests_total{") && line.ends_with(" 2")));
    }

    #[test]
    fn independent_sinks_do_not_share_state() {
        let first = create().unwrap();
        let second = create().unwrap();

        first
            .emit(&MetricEvent::counter("only_in_first_total", Labels::new()))
            .unwrap();

        assert!(first.render().contains("only_in_first_total"));
        assert!(!second.render().contains("only_in_first_total"));
    }
}
