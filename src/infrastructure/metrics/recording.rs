use crate::domain::{MetricEvent, MetricKind};
use metrics::{counter, gauge, histogram, with_local_recorder, Label, Recorder};

/// Record one event against `recorder` using the `metrics` macros.
///
/// Shared by every facade-backed sink; the recorder decides how the value
/// is exported (scraped text for Prometheus, datagrams for DogStatsD).
pub fn record_event(recorder: &dyn Recorder, event: &MetricEvent) {
    let name = event.name.clone();
    let labels: Vec<Label> = event
        .labels
        .iter()
        .map(|(key, value)| Label::new(key.clone(), value.clone()))
        .collect();

    with_local_recorder(recorder, || match event.kind {
        MetricKind::Counter => counter!(name, labels).increment(event.value as u64),
        MetricKind::Gauge => gauge!(name, labels).set(event.value),
        MetricKind::Histogram => histogram!(name, labels).record(event.value),
    });
}
