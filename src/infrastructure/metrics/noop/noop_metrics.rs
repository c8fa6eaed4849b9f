use crate::domain::{MetricEvent, MetricsSink};
use anyhow::Result;

/// Sink that drops everything.
#[derive(Debug, Default)]
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl MetricsSink for NoopMetrics {
    // ---
    fn emit(&self, _: &MetricEvent) -> Result<()> {
        Ok(())
    }
    fn render(&self) -> String {
        String::new()
    }
}
