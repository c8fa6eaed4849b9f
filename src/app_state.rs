//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. It carries the injected metrics
//! sink and the user repository; both are behind `Arc`, so cloning the
//! state per request is cheap.

use crate::domain::{MetricsPtr, RepositoryPtr};

/// Shared application state passed to all Axum handlers.
///
/// This struct serves as the Dependency Injection container for the
/// application. Handlers depend on the `MetricsSink` and `Repository`
/// abstractions, never on a concrete backend, and nothing here is a
/// process-wide global.
///
/// # Lifecycle
///
/// 1. Created once in `build_router()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub(crate) struct AppState {
    /// Metrics sink shared with the emission policy.
    ///
    /// Handlers only use it to render `/metrics`; events are emitted by the
    /// lifecycle hooks.
    metrics: MetricsPtr,

    /// Repository abstraction for the `users` table.
    repository: RepositoryPtr,

    /// Upper bound for `/memory-usage?size=`, in MB.
    memory_max_mb: u64,
}

impl AppState {
    // ---

    pub fn new(metrics: MetricsPtr, repository: RepositoryPtr, memory_max_mb: u64) -> Self {
        // ---
        AppState {
            metrics,
            repository,
            memory_max_mb,
        }
    }

    /// Get a reference to the metrics sink.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Get a reference to the repository implementation.
    pub(crate) fn repository(&self) -> &RepositoryPtr {
        // ---
        &self.repository
    }

    pub(crate) fn memory_max_mb(&self) -> u64 {
        self.memory_max_mb
    }
}
