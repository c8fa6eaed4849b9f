// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod business;
mod database_query;
mod health;
mod metrics;
mod root;
mod shared_types;
mod simulation;
mod users;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::root_handler;

// User CRUD handlers
pub use users::{create_user, list_users};

// Golden-signal simulation handlers
pub use simulation::{cpu_intensive, delay, error, memory_usage};

// Database and business demo handlers
pub use business::business_metrics;
pub use database_query::database_query;
