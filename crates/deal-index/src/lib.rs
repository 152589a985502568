//! # Deal Range Index
//!
//! Hierarchical range index over apartment-deal records. Records arrive
//! grouped by region, then sub-region, then complex; the index stores for
//! every group only the half-open `[start, end)` row range it occupies, so
//! any group is retrieved as a contiguous slice of the record store.
//!
//! ## Build Pipeline
//!
//! ```text
//! CSV export ──→ CsvRecordSource ──→ RangeIndexBuilder ──finish──→ DealSnapshot
//!                 (decode, parse)     (open/close groups)            (frozen, shared)
//!                                                                        │
//!                                                                        ↓
//!                                                               DealLookupService
//! ```
//!
//! ## Row-Id Indirection
//!
//! Below the region level every query takes a row id rather than a group
//! key. The key is re-derived from the referenced row, so clients never
//! encode region or complex names in a request.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement | Location |
//! |-----------|-------------|----------|
//! | Regions partition `[0, len)` | Builder opens/closes in row order | `domain/builder.rs` |
//! | Children partition their parent | Closing cascades from complex upward | `domain/builder.rs` |
//! | No range is left open | `finish` closes every level at `len` | `domain/builder.rs` |
//! | Every row resolves to its own complex | Checked by `verify_snapshot` | `domain/invariants.rs` |
//!
//! Input that revisits a closed group breaks these guarantees. The default
//! [`OrderPolicy::Trust`] logs and overwrites; [`OrderPolicy::Reject`] fails
//! the build instead.
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): records, ranges, builder, invariants
//! - **Ports Layer** (`ports/`): lookup API, decoder SPI, ingest errors
//! - **Service** (`service.rs`): ingest pipeline and lookup implementation
//! - **Adapters Layer** (`adapters/`): UTF-8 decoder, CSV source, method dispatch

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types for convenience
pub use domain::{
    invariant_finalized, invariant_partition, invariant_resolvable, verify_snapshot,
    ComplexListing, ComplexNode, DealSnapshot, GroupKey, IndexConfig, IndexError, IndexStats,
    InvariantViolation, Level, LookupError, LookupErrorPayload, LookupErrorType, OrderPolicy,
    Range, RangeIndex, RangeIndexBuilder, Record, RecordStore, RegionNode, RowId, RowSlice,
    SubRegionNode,
};

pub use ports::{DealLookupApi, DecodeError, FieldDecoder, IngestError};

pub use service::{ingest, DealLookupService};

pub use adapters::{
    handle_api_query, ingest_csv, parse_line, ApiHandler, ApiQueryError, CsvConfig,
    CsvRecordSource, DealView, Utf8Decoder,
};

/// Crate version, reported by health endpoints.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
