use anyhow::Context;
use metrics_exporter_dogstatsd::{DogStatsDBuilder, DogStatsDRecorder};
use std::time::Duration;

/// How often aggregated counters and gauges are flushed to the agent.
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(3);

/// Build a DogStatsD recorder that is NOT installed globally.
///
/// The agent address is resolved here, once; a host that does not resolve
/// is a startup error. Histograms are sent as `h` samples rather than
/// distributions.
pub fn build_recorder(
    host: &str,
    port: u16,
    flush_interval: Duration,
) -> anyhow::Result<DogStatsDRecorder> {
    let address = format!("udp://{host}:{port}");

    DogStatsDBuilder::default()
        .with_remote_address(&address)
        .with_context(|| format!("invalid DogStatsD agent address {address}"))?
        .with_telemetry(false)
        .send_histograms_as_distributions(false)
        .with_flush_interval(flush_interval)
        .build()
        .with_context(|| format!("failed to build DogStatsD recorder for {address}"))
}
