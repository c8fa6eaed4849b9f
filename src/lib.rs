// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;

use domain::RepositoryPtr;
use handlers::*;
use lifecycle::{request_lifecycle, EmissionPolicy, HookManager};

// Public exports (visible outside this module)
pub mod domain;
pub mod lifecycle;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    connect_lazy, // ---
    create_memory_metrics,
    create_metrics,
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
    create_statsd_metrics,
    MemoryMetrics,
};

/// Build the full application from configuration.
///
/// Creates the lazily-connected PostgreSQL pool, makes sure the `users`
/// table exists (a failure is only logged so the service still starts while
/// the database is down), selects the metrics sink and wires the router.
pub async fn create_app(config: &AppConfig) -> Result<Router> {
    // ---
    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    let repository = create_postgres_repository(connect_lazy(&config.database));
    if let Err(err) = repository.ensure_schema().await {
        tracing::warn!("Could not ensure users table: {err:#}");
    }

    let (sink, names) = create_metrics(&config.metrics)?;
    let policy = Arc::new(EmissionPolicy::new(
        sink,
        config.metrics.service_name.clone(),
        names,
    ));

    Ok(build_router(repository, policy, &config.server))
}

/// Build the HTTP router around an explicit repository and emission policy.
///
/// Every route, including the 404 fallback, runs through the request
/// lifecycle middleware with the policy's hooks installed.
pub fn build_router(
    repository: RepositoryPtr,
    policy: Arc<EmissionPolicy>,
    server: &ServerConfig,
) -> Router {
    // ---
    let mut hooks = HookManager::new();
    policy.install(&mut hooks);

    let app_state = AppState::new(policy.sink().clone(), repository, server.memory_max_mb);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/users", get(list_users).post(create_user))
        .route("/delay", get(delay))
        .route("/error", get(error))
        .route("/cpu-intensive", get(cpu_intensive))
        .route("/memory-usage", get(memory_usage))
        .route("/database-query", get(database_query))
        .route("/business-metrics", get(business_metrics))
        .layer(from_fn_with_state(Arc::new(hooks), request_lifecycle))
        .with_state(app_state)
}
