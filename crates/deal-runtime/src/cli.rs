//! Command-line arguments.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use deal_index::OrderPolicy;

use crate::config::{ConfigError, RuntimeConfig};

/// Deal Runtime: index an apartment-deal export and serve lookups over HTTP
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "deal-runtime")]
#[command(version, about = "Index an apartment-deal export and serve lookups over HTTP")]
pub struct Args {
    /// CSV export to load
    pub data_file: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to bind the HTTP server to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Number of leading lines to skip in the export
    #[arg(long)]
    pub header_lines: Option<usize>,

    /// Abort the load when a group key reappears after its group closed
    #[arg(long)]
    pub strict_order: bool,

    /// Verify index invariants before serving
    #[arg(long)]
    pub verify: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Answer one lookup method (e.g. `list_complexes`) and exit instead of serving
    #[arg(long, value_name = "METHOD")]
    pub query: Option<String>,

    /// JSON params for `--query`, e.g. '{"row_id": 42}'
    #[arg(long, value_name = "JSON", requires = "query")]
    pub params: Option<String>,
}

impl Args {
    /// Apply flags on top of `config`. Flags that were not given leave it untouched.
    pub fn apply(&self, config: &mut RuntimeConfig) {
        if let Some(host) = self.host {
            config.gateway.host = host;
        }
        if let Some(port) = self.port {
            config.gateway.port = port;
        }
        if let Some(lines) = self.header_lines {
            config.ingest.header_lines = lines;
        }
        if self.strict_order {
            config.ingest.order_policy = OrderPolicy::Reject;
        }
        if self.verify {
            config.ingest.verify_after_build = true;
        }
        if self.log_json {
            config.logging.json = true;
        }
    }

    /// Build the effective configuration: defaults, file, environment, flags.
    pub fn resolve_config<F>(&self, env: F) -> Result<RuntimeConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => RuntimeConfig::load(path)?,
            None => RuntimeConfig::default(),
        };
        config.apply_env(env)?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}
