//! Process configuration read from environment variables.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Port used when neither `BIND_ADDR` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 8080;
/// Default maximum number of pooled database connections.
pub const DEFAULT_POOL_MAX_SIZE: u32 = 10;
/// Default per-operation deadline in milliseconds.
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5_000;
/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "review_rotation=info,tower_http=info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set or is blank.
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Description of the accepted format.
        expected: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Runtime settings for the review rotation server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Maximum pooled database connections.
    pub pool_max_size: u32,
    /// Deadline applied to each assignment operation.
    pub operation_timeout: Duration,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl RotationConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `DATABASE_URL` is missing or a numeric or
    /// address variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns the value of a
    /// variable when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `DATABASE_URL` is missing or a numeric or
    /// address variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let database_url = read("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = match (read("BIND_ADDR"), read("PORT")) {
            (Some(addr), _) => parse(&addr, "BIND_ADDR", "a socket address such as 0.0.0.0:8080")?,
            (None, Some(port)) => SocketAddr::from((
                Ipv4Addr::UNSPECIFIED,
                parse(&port, "PORT", "a port number")?,
            )),
            (None, None) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
        };

        let pool_max_size = read("DB_POOL_MAX_SIZE")
            .map(|value| parse(&value, "DB_POOL_MAX_SIZE", "a positive integer"))
            .transpose()?
            .unwrap_or(DEFAULT_POOL_MAX_SIZE);
        if pool_max_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_POOL_MAX_SIZE",
                expected: "a positive integer",
                value: "0".to_owned(),
            });
        }

        let timeout_ms = read("OPERATION_TIMEOUT_MS")
            .map(|value| parse(&value, "OPERATION_TIMEOUT_MS", "a number of milliseconds"))
            .transpose()?
            .unwrap_or(DEFAULT_OPERATION_TIMEOUT_MS);

        let log_filter = read("LOG_FILTER").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());

        Ok(Self {
            database_url,
            bind_addr,
            pool_max_size,
            operation_timeout: Duration::from_millis(timeout_ms),
            log_filter,
        })
    }
}

fn parse<T: std::str::FromStr>(
    value: &str,
    name: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value: value.to_owned(),
    })
}
