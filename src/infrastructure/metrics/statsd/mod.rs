// src/infrastructure/metrics/statsd/mod.rs
mod recorder;
mod statsd_metrics;

pub(crate) use recorder::build_recorder;
pub use statsd_metrics::StatsdMetrics;
use std::sync::Arc;

/// Creates a DogStatsD sink that pushes events over UDP to `host:port`.
///
/// Fails when the agent host cannot be resolved, so a misconfigured
/// `DD_AGENT_HOST` is reported at startup instead of once per request.
pub fn create(host: &str, port: u16) -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!(host, port, "Initializing DogStatsD metrics");

    let recorder = build_recorder(host, port, recorder::FLUSH_INTERVAL)?;
    Ok(Arc::new(StatsdMetrics::new(recorder)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_with_reachable_address_succeeds() {
        assert!(create("127.0.0.1", 8125).is_ok());
    }

    #[test]
    fn unresolvable_agent_fails_at_creation() {
        let err = create("statsd-agent.invalid", 8125).err().expect("lookup must fail");
        assert!(format!("{err:#}").contains("statsd-agent.invalid"), "{err:#}");
    }
}
