mod postgres_repository;


use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

pub use postgres_repository::create_postgres_repository;

/// Build a connection pool without opening any connection yet.
///
/// Connections are established on first use, so the service starts even
/// when the database is down; `/health` then reports it as disconnected.
pub fn connect_lazy(config: &DatabaseConfig) -> PgPool {
    // ---
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .password(&config.password);

    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "Configuring PostgreSQL pool"
    );

    PgPoolOptions::new()
        .acquire_timeout(config.acquire_timeout)
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .connect_lazy_with(options)
}
