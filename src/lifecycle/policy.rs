//! Translation of a finished request into metric events.
//!
//! The policy owns no per-request state. The only thing it keeps across
//! requests is the in-flight request count, which it tracks itself instead
//! of reading it back from the sink.

use super::context::{RequestContext, ResponseDescriptor};
use super::hooks::HookManager;
use crate::domain::{Labels, MetricEvent, MetricsPtr};
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Megabytes to bytes.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Routes that hit the relational store.
pub const DATABASE_ENDPOINTS: [&str; 3] = ["/users", "/database-query", "/health"];

const DELAY_ENDPOINT: &str = "/delay";
const MEMORY_ENDPOINT: &str = "/memory-usage";
const CPU_ENDPOINT: &str = "/cpu-intensive";
const BUSINESS_ENDPOINT: &str = "/business-metrics";

const DEFAULT_BUSINESS_VALUE: f64 = 1.0;
const DEFAULT_MEMORY_MB: u64 = 10;
const DEFAULT_CPU_SECONDS: f64 = 0.0;

/// Metric names emitted by the policy. Each backend has its own naming
/// convention, so the names are chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNames {
    pub request_latency: String,
    pub request_count: String,
    pub error_count: String,
    pub database_queries: String,
    pub business_value: String,
    pub memory_usage: String,
    pub cpu_usage: String,
    pub business_operations: String,
    pub active_requests: String,
}

impl MetricNames {
    /// Prometheus conventions: `_total` counters, base units in the name.
    pub fn prometheus() -> Self {
        Self {
            request_latency: "http_request_duration_seconds".into(),
            request_count: "http_requests_total".into(),
            error_count: "http_errors_total".into(),
            database_queries: "database_queries_total".into(),
            business_value: "business_value".into(),
            memory_usage: "memory_usage_bytes".into(),
            cpu_usage: "cpu_usage_seconds".into(),
            business_operations: "business_operations_total".into(),
            active_requests: "active_requests".into(),
        }
    }

    /// Names used with the DogStatsD agent.
    pub fn statsd() -> Self {
        Self {
            request_latency: "request_latency_seconds_hist".into(),
            request_count: "request_count".into(),
            error_count: "error_count".into(),
            database_queries: "database_queries_total".into(),
            business_value: "business_value".into(),
            memory_usage: "memory_usage_bytes".into(),
            cpu_usage: "cpu_usage_seconds".into(),
            business_operations: "business_operations".into(),
            active_requests: "active_requests".into(),
        }
    }
}

/// Decides which metric events a request produces and forwards them to the
/// injected sink.
pub struct EmissionPolicy {
    sink: MetricsPtr,
    service: String,
    names: MetricNames,
    active_requests: AtomicI64,
}

impl EmissionPolicy {
    // ---
    pub fn new(sink: MetricsPtr, service: impl Into<String>, names: MetricNames) -> Self {
        Self {
            sink,
            service: service.into(),
            names,
            active_requests: AtomicI64::new(0),
        }
    }

    pub fn sink(&self) -> &MetricsPtr {
        &self.sink
    }

    pub fn active_requests(&self) -> i64 {
        self.active_requests.load(Ordering::Acquire)
    }

    /// Register the policy's hooks on `hooks`.
    ///
    /// Before: start timer, then count the request as in flight.
    /// After: release the in-flight slot, stop the timer (latency histogram),
    /// then record request data. The latency hook must precede the request
    /// counting hook so backends see the observations in that order.
    pub fn install(self: &Arc<Self>, hooks: &mut HookManager) {
        // ---
        hooks.register_before(|ctx: &mut RequestContext| -> Result<()> {
            ctx.start_timer();
            Ok(())
        });

        let policy = Arc::clone(self);
        hooks.register_before(move |_: &mut RequestContext| -> Result<()> {
            policy.request_started();
            Ok(())
        });

        let policy = Arc::clone(self);
        hooks.register_after(
            move |_: &RequestContext, response: ResponseDescriptor| -> Result<ResponseDescriptor> {
                policy.request_finished();
                Ok(response)
            },
        );

        let policy = Arc::clone(self);
        hooks.register_after(
            move |ctx: &RequestContext, response: ResponseDescriptor| -> Result<ResponseDescriptor> {
                let event = policy.latency_event(ctx, &response)?;
                policy.emit(&event);
                Ok(response)
            },
        );

        let policy = Arc::clone(self);
        hooks.register_after(
            move |ctx: &RequestContext, response: ResponseDescriptor| -> Result<ResponseDescriptor> {
                for event in policy.request_events(ctx, &response) {
                    policy.emit(&event);
                }
                Ok(response)
            },
        );
    }

    /// Latency histogram observation for a finished request.
    ///
    /// # Errors
    /// Fails when the request timer was never started.
    pub fn latency_event(
        &self,
        ctx: &RequestContext,
        response: &ResponseDescriptor,
    ) -> Result<MetricEvent> {
        // ---
        let elapsed = ctx
            .elapsed()
            .ok_or_else(|| anyhow!("request timer was never started for {}", ctx.path()))?;

        Ok(MetricEvent::histogram(
            &self.names.request_latency,
            elapsed.as_secs_f64(),
            self.request_labels(ctx, response),
        ))
    }

    /// Every event other than the latency observation, in emission order.
    pub fn request_events(
        &self,
        ctx: &RequestContext,
        response: &ResponseDescriptor,
    ) -> Vec<MetricEvent> {
        // ---
        let labels = self.request_labels(ctx, response);
        let fields = ctx.fields();
        let path = ctx.path();
        let mut events = vec![MetricEvent::counter(&self.names.request_count, labels.clone())];

        if response.is_error() {
            events.push(MetricEvent::counter(&self.names.error_count, labels));
        }

        if DATABASE_ENDPOINTS.contains(&path) {
            let labels = self.labels([("endpoint", path), ("method", ctx.method())]);
            events.push(MetricEvent::counter(&self.names.database_queries, labels));
        }

        match path {
            DELAY_ENDPOINT => events.push(MetricEvent::gauge(
                &self.names.business_value,
                fields.business_value.unwrap_or(DEFAULT_BUSINESS_VALUE),
                self.labels([("metric_type", "performance")]),
            )),
            MEMORY_ENDPOINT => {
                let size_mb = fields.memory_size_mb.unwrap_or(DEFAULT_MEMORY_MB);
                events.push(MetricEvent::gauge(
                    &self.names.memory_usage,
                    size_mb.saturating_mul(BYTES_PER_MB) as f64,
                    self.labels([("operation", "memory_allocation")]),
                ));
            }
            CPU_ENDPOINT => events.push(MetricEvent::gauge(
                &self.names.cpu_usage,
                fields.cpu_execution_seconds.unwrap_or(DEFAULT_CPU_SECONDS),
                self.labels([("operation", "cpu_intensive")]),
            )),
            BUSINESS_ENDPOINT => {
                let operation = fields.operation.as_deref().unwrap_or("unknown");
                events.push(MetricEvent::counter(
                    &self.names.business_operations,
                    self.labels([("operation_type", operation)]),
                ));
            }
            _ => {}
        }

        events
    }

    /// Forward one event; sink failures are logged and dropped.
    pub fn emit(&self, event: &MetricEvent) {
        // ---
        tracing::debug!(metric = %event.name, kind = %event.kind, value = event.value, "Emitting metric");

        if let Err(err) = self.sink.emit(event) {
            tracing::warn!(metric = %event.name, "Dropping metric event: {err:#}");
        }
    }

    fn request_started(&self) {
        let current = self.active_requests.fetch_add(1, Ordering::AcqRel) + 1;
        self.emit_active(current);
    }

    fn request_finished(&self) {
        // Never go below zero, even if a before-hook failed to count the request.
        let previous = self
            .active_requests
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some((n - 1).max(0)))
            .unwrap_or(0);
        self.emit_active((previous - 1).max(0));
    }

    fn emit_active(&self, current: i64) {
        let event = MetricEvent::gauge(
            &self.names.active_requests,
            current as f64,
            self.labels([]),
        );
        self.emit(&event);
    }

    /// `service`, `endpoint`, `method`, `status`.
    fn request_labels(&self, ctx: &RequestContext, response: &ResponseDescriptor) -> Labels {
        let status = response.status_code().to_string();
        self.labels([
            ("endpoint", ctx.path()),
            ("method", ctx.method()),
            ("status", status.as_str()),
        ])
    }

    /// The service label plus `extra`.
    fn labels<const N: usize>(&self, extra: [(&str, &str); N]) -> Labels {
        let mut labels = Labels::new();
        labels.insert("service".to_string(), self.service.clone());
        for (key, value) in extra {
            labels.insert(key.to_string(), value.to_string());
        }
        labels
    }
}
