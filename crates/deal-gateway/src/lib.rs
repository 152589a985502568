//! Deal Gateway - HTTP lookup interface over the deal range index.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  DEAL GATEWAY (HTTP)                 │
//! ├──────────────────────────────────────────────────────┤
//! │  Middleware:  TraceLayer → CORS                      │
//! │                       │                              │
//! │  Routes:  /provinces  /cities/:id  /complexes/:id    │
//! │           /deals/:id  /districts/:id/deals           │
//! │           /deal/:id   /health                        │
//! │                       │                              │
//! │              Arc<dyn DealLookupApi>                  │
//! └───────────────────────┼──────────────────────────────┘
//!                         ▼
//!              DealLookupService (frozen snapshot)
//! ```
//!
//! # Error Mapping
//!
//! - Non-numeric row id in the path: `400`
//! - Row id out of range, or key absent from the index: `404`
//!
//! Error bodies have the shape `{"error": {"code": ..., "message": ...}}`.
//!
//! # Usage
//!
//! ```ignore
//! use deal_gateway::{DealGateway, GatewayConfig};
//!
//! let gateway = DealGateway::new(GatewayConfig::default(), api)?;
//! gateway.run(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod routes;
pub mod service;

pub use domain::{codes, ApiError, ConfigError, CorsConfig, GatewayConfig, GatewayError};
pub use middleware::create_cors_layer;
pub use service::{build_router, DealGateway};
