//! Global tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, LoggingConfig};

/// Install the global subscriber. Call once, before anything logs.
///
/// Logs go to stderr; stdout carries `--query` results.
pub fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| ConfigError::Invalid(format!("logging.filter: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| ConfigError::Invalid(format!("logging already initialized: {}", e)))
}
