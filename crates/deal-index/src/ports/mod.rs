//! # Ports Layer
//!
//! Hexagonal architecture ports (interfaces) for the deal range index.
//!
//! - **Driving Ports (Inbound)**: the lookup API consumed by adapters
//! - **Driven Ports (Outbound)**: text decoding and record sources used by ingestion

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
