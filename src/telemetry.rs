//! Structured logging setup.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive is malformed.
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),
    /// A global subscriber was installed earlier.
    #[error("log subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Installs a formatted `tracing` subscriber filtered by `directive`.
///
/// `RUST_LOG`, when set, overrides `directive`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the directive cannot be parsed or a
/// subscriber is already installed.
pub fn init(directive: &str) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directive))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInstalled(err.to_string()))
}
