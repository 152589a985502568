//! # Domain Layer
//!
//! Pure index logic for the deal range index.
//!
//! - `entities`: Record, RecordStore, Range, index nodes, DealSnapshot
//! - `builder`: single-pass RangeIndexBuilder
//! - `invariants`: partition / finalization / resolution checks
//! - `value_objects`: RowId, Level, IndexConfig
//!
//! This module contains NO I/O dependencies. Ingestion and serving go
//! through the ports in the `ports` module.

pub mod builder;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use builder::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
