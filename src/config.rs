// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Every setting has a default suitable for the docker-compose demo stack;
//! values that are present but invalid are treated as deployment errors
//! rather than silently replaced.

use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional string environment variable, falling back to
/// `$default` when it is unset.
macro_rules! optional_env {
    // ---
    ($key:literal, $default:expr) => {
        std::env::var($key).unwrap_or_else(|_| $default.to_string())
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads an optional environment variable that must parse when present.
///
/// Used for selectors (like the metrics backend) where a typo should stop
/// the deployment instead of quietly picking the default.
macro_rules! strict_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        match std::env::var($key) {
            Ok(raw) => raw.parse::<$ty>().map_err(|err| {
                anyhow::anyhow!(concat!("Invalid configuration: ", $key, " ({})"), err)
            })?,
            Err(_) => $default,
        }
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails because of an invalid
/// environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_invalid_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Invalid configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: database::DatabaseConfig,
    pub metrics: metrics::MetricsConfig,
    pub server: server::ServerConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any present configuration value is invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            database: database::DatabaseConfig::from_env()?,
            metrics: metrics::MetricsConfig::from_env()?,
            server: server::ServerConfig::from_env()?,
        })
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// PostgreSQL connection settings.
    #[derive(Clone)]
    pub struct DatabaseConfig {
        /// Server host name. Defaults to `postgres`.
        pub host: String,

        /// Server port. Defaults to 5432.
        pub port: u16,

        /// Database name. Defaults to `postgres`.
        pub name: String,

        /// Login role. Defaults to `root`.
        pub user: String,

        /// Login password. Defaults to `changeme`.
        pub password: String,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 5 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 0.
        pub min_connections: u32,

        /// Maximum number of connections open concurrently. Defaults to 10.
        pub max_connections: u32,
    }

    // Hand-written so the password never ends up in logs.
    impl fmt::Debug for DatabaseConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("DatabaseConfig")
                .field("host", &self.host)
                .field("port", &self.port)
                .field("name", &self.name)
                .field("user", &self.user)
                .field("password", &"***")
                .field("acquire_timeout", &self.acquire_timeout)
                .field("min_connections", &self.min_connections)
                .field("max_connections", &self.max_connections)
                .finish()
        }
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let acquire_timeout_secs = optional_env_parse!("DB_ACQUIRE_TIMEOUT_SEC", u64, 5);

            Ok(Self {
                host: optional_env!("DB_HOST", "postgres"),
                port: strict_env_parse!("DB_PORT", u16, 5432),
                name: optional_env!("DB_NAME", "postgres"),
                user: optional_env!("DB_USER", "root"),
                password: optional_env!("DB_PASSWORD", "changeme"),
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections: optional_env_parse!("DB_MIN_CONNECTIONS", u32, 0),
                max_connections: optional_env_parse!("DB_MAX_CONNECTIONS", u32, 10),
            })
        }
    }
}
pub use self::database::DatabaseConfig;

// ============================================================
// Metrics configuration
// ============================================================

mod metrics {
    // ---
    use super::*;

    /// Which metrics sink the service reports to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MetricsBackend {
        /// Pull model: text exposition on `/metrics`.
        Prometheus,
        /// Push model: DogStatsD datagrams over UDP.
        Statsd,
        /// Discard everything.
        Noop,
    }

    impl FromStr for MetricsBackend {
        type Err = String;

        fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
            match raw.trim().to_ascii_lowercase().as_str() {
                "prom" | "prometheus" => Ok(Self::Prometheus),
                "statsd" | "datadog" => Ok(Self::Statsd),
                "noop" | "none" | "" => Ok(Self::Noop),
                other => Err(format!("unknown metrics backend '{other}'")),
            }
        }
    }

    impl fmt::Display for MetricsBackend {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                Self::Prometheus => "prom",
                Self::Statsd => "statsd",
                Self::Noop => "noop",
            };
            f.write_str(name)
        }
    }

    /// Metrics sink selection and its transport settings.
    #[derive(Debug, Clone)]
    pub struct MetricsConfig {
        /// Selected backend. Defaults to no-op.
        pub backend: MetricsBackend,

        /// Value of the `service` label on every event. Defaults to `webapp`.
        pub service_name: String,

        /// DogStatsD agent host. Defaults to `datadog`.
        pub statsd_host: String,

        /// DogStatsD agent port. Defaults to 8125.
        pub statsd_port: u16,
    }

    impl MetricsConfig {
        /// Builds a [`MetricsConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `METRICS_BACKEND` names an unknown backend.
        pub fn from_env() -> Result<Self> {
            // ---
            Ok(Self {
                backend: strict_env_parse!("METRICS_BACKEND", MetricsBackend, MetricsBackend::Noop),
                service_name: optional_env!("METRICS_SERVICE_NAME", "webapp"),
                statsd_host: optional_env!("DD_AGENT_HOST", "datadog"),
                statsd_port: optional_env_parse!("DD_DOGSTATSD_PORT", u16, 8125),
            })
        }
    }
}
pub use self::metrics::{MetricsBackend, MetricsConfig};

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// HTTP listener and simulation limits.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Listen address. Defaults to `0.0.0.0:3001`.
        pub bind_addr: String,

        /// Largest allocation `/memory-usage` accepts, in MB. Defaults to 1024.
        pub memory_max_mb: u64,
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            Ok(Self {
                bind_addr: optional_env!("API_BIND_ADDR", "0.0.0.0:3001"),
                memory_max_mb: optional_env_parse!("MEMORY_MAX_MB", u64, 1024),
            })
        }
    }

    impl Default for ServerConfig {
        fn default() -> Self {
            Self {
                bind_addr: "0.0.0.0:3001".to_string(),
                memory_max_mb: 1024,
            }
        }
    }
}
pub use self::server::ServerConfig;

// ============================================================
// Tests
// ============================================================
