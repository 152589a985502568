//! Gateway domain: configuration and error types.

pub mod config;
pub mod error;

pub use config::{ConfigError, CorsConfig, GatewayConfig};
pub use error::{codes, ApiError, GatewayError};
