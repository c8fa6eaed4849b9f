mod metrics;
mod models;
mod repository;

// Publicly expose the metrics sink abstraction
pub use metrics::{Labels, MetricEvent, MetricKind, MetricsPtr, MetricsSink};

// Publicly expose persistence abstractions
pub use models::User;
pub use repository::{Repository, RepositoryPtr};
