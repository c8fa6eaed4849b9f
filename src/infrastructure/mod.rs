mod database;
pub mod metrics;

// Re-export the factory functions for easy access
pub use database::{connect_lazy, create_postgres_repository};
pub use metrics::{
    create_memory_metrics, create_metrics, create_noop_metrics, create_prom_metrics,
    create_statsd_metrics, MemoryMetrics,
};
