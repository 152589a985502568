//! # Deal Runtime Library
//!
//! Configuration, CLI and logging setup for the `deal-runtime` binary,
//! exposed as a library for testing. The main entry point is `main.rs`.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags, load configuration (file → env → flags), validate
//! 2. Initialize logging
//! 3. Load the export and build the index (fail fast)
//! 4. Optionally verify index invariants
//! 5. Serve HTTP until Ctrl+C, then shut down gracefully, or answer a
//!    single `--query` and exit

pub mod cli;
pub mod config;
pub mod logging;
pub mod query;

pub use cli::Args;
pub use config::{ConfigError, IngestConfig, LoggingConfig, RuntimeConfig};
pub use query::{run_query, QueryError};
