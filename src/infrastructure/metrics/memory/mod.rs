use crate::domain::{MetricEvent, MetricsSink};
use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};

/// Creates an in-memory sink that keeps every event it receives.
///
/// Returned as the concrete type so callers (mostly tests) can inspect the
/// recorded events; it coerces to `MetricsPtr` wherever one is expected.
pub fn create() -> Arc<MemoryMetrics> {
    Arc::new(MemoryMetrics::default())
}

/// Sink that records events in emission order.
#[derive(Debug, Default)]
pub struct MemoryMetrics {
    events: Mutex<Vec<MetricEvent>>,
}

impl MemoryMetrics {
    // ---
    /// Snapshot of all events recorded so far.
    pub fn events(&self) -> Vec<MetricEvent> {
        self.lock().clone()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.name.clone()).collect()
    }

    /// Events whose name equals `name`.
    pub fn named(&self, name: &str) -> Vec<MetricEvent> {
        self.lock()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MetricEvent>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Memory metrics mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl MetricsSink for MemoryMetrics {
    fn emit(&self, event: &MetricEvent) -> Result<()> {
        self.lock().push(event.clone());
        Ok(())
    }

    /// One `name{labels} value` line per recorded event.
    fn render(&self) -> String {
        self.lock()
            .iter()
            .map(|e| {
                let labels: Vec<String> =
                    e.labels.iter().map(|(k, v)| format!("{k}=\"{v}\"")).collect();
                format!("{}{{{}}} {}\n", e.name, labels.join(","), e.value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Labels;

    #[test]
    fn records_events_in_order() {
        let sink = create();
        sink.emit(&MetricEvent::counter("a", Labels::new())).unwrap();
        sink.emit(&MetricEvent::gauge("b", 2.0, Labels::new())).unwrap();

        assert_eq!(sink.event_names(), vec!["a", "b"]);
        assert_eq!(sink.named("b")[0].value, 2.0);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn render_lists_labels() {
        let sink = create();
        let mut labels = Labels::new();
        labels.insert("service".into(), "webapp".into());
        sink.emit(&MetricEvent::counter("request_count", labels)).unwrap();

        assert_eq!(sink.render(), "request_count{service=\"webapp\"} 1\n");
    }
}
