//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::{HeaderName, HeaderValue, Method};

/// Main gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind address
    pub host: IpAddr,
    /// Bind port (0 picks an ephemeral port)
    pub port: u16,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            cors: CorsConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cors.validate()
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// CORS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers ("*" for all)
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache, in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string()],
            allowed_headers: vec!["*".to_string()],
            max_age: 86400, // 24 hours
        }
    }
}

impl CorsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.allowed_methods.is_empty() {
            return Err(ConfigError::InvalidCors(
                "allowed_methods cannot be empty".into(),
            ));
        }
        if let Some(m) = self
            .allowed_methods
            .iter()
            .find(|m| m.parse::<Method>().is_err())
        {
            return Err(ConfigError::InvalidCors(format!("invalid method '{}'", m)));
        }
        if let Some(o) = self
            .allowed_origins
            .iter()
            .find(|o| *o != "*" && o.parse::<HeaderValue>().is_err())
        {
            return Err(ConfigError::InvalidCors(format!("invalid origin '{}'", o)));
        }
        if let Some(h) = self
            .allowed_headers
            .iter()
            .find(|h| *h != "*" && h.parse::<HeaderName>().is_err())
        {
            return Err(ConfigError::InvalidCors(format!("invalid header '{}'", h)));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid CORS configuration
    #[error("invalid cors: {0}")]
    InvalidCors(String),
}
