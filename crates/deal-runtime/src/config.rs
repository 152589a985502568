//! Runtime configuration.
//!
//! Layers, lowest precedence first: built-in defaults, TOML file,
//! environment (`DEAL_HTTP_HOST`, `DEAL_HTTP_PORT`, `DEAL_LOG`), CLI flags.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use deal_gateway::GatewayConfig;
use deal_index::{CsvConfig, IndexConfig, OrderPolicy};

pub const ENV_HTTP_HOST: &str = "DEAL_HTTP_HOST";
pub const ENV_HTTP_PORT: &str = "DEAL_HTTP_PORT";
pub const ENV_LOG: &str = "DEAL_LOG";
pub const ENV_RUST_LOG: &str = "RUST_LOG";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Loading and index build.
    pub ingest: IngestConfig,
    /// HTTP server.
    pub gateway: GatewayConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// Ingestion configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Leading lines of the export to skip.
    pub header_lines: usize,
    /// What to do when a closed group reappears.
    pub order_policy: OrderPolicy,
    /// Expected record count, to pre-size the store.
    pub capacity_hint: Option<usize>,
    /// Check partition and resolution invariants before serving.
    pub verify_after_build: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            header_lines: CsvConfig::default().header_lines,
            order_policy: OrderPolicy::default(),
            capacity_hint: None,
            verify_after_build: false,
        }
    }
}

impl IngestConfig {
    pub fn csv(&self) -> CsvConfig {
        CsvConfig {
            header_lines: self.header_lines,
        }
    }

    pub fn index(&self) -> IndexConfig {
        IndexConfig {
            order_policy: self.order_policy,
            capacity_hint: self.capacity_hint,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `deal_index=debug,info`.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl RuntimeConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Override from environment variables, read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HTTP_HOST) {
            self.gateway.host = host
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{} '{}'", ENV_HTTP_HOST, host)))?;
        }
        if let Some(port) = lookup(ENV_HTTP_PORT) {
            self.gateway.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{} '{}'", ENV_HTTP_PORT, port)))?;
        }
        if let Some(filter) = lookup(ENV_LOG).or_else(|| lookup(ENV_RUST_LOG)) {
            self.logging.filter = filter;
        }
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter cannot be empty".into()));
        }
        if self.ingest.capacity_hint == Some(0) {
            return Err(ConfigError::Invalid(
                "ingest.capacity_hint must be positive when set".into(),
            ));
        }
        Ok(())
    }
}
