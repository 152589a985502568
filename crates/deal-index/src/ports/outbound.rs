//! # Outbound Ports (Driven Ports)
//!
//! SPIs the ingestion pipeline depends on.
//!
//! A record source is any `Iterator<Item = Result<Record, IngestError>>`
//! yielding records in grouped order; the CSV adapter is one such source.

use thiserror::Error;

use crate::domain::IndexError;

/// Converts raw field bytes into normalized text.
///
/// Exports from different publishers use different encodings; implementing
/// this trait is the only thing needed to support another one.
pub trait FieldDecoder: Send + Sync {
    /// Decode one line of raw bytes (without the line terminator).
    fn decode(&self, raw: &[u8]) -> Result<String, DecodeError>;
}

/// Text decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decode as {encoding}: invalid byte at offset {offset}")]
pub struct DecodeError {
    pub encoding: &'static str,
    pub offset: usize,
}

/// Errors that abort a load.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading the source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be decoded to text.
    #[error("line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: DecodeError,
    },

    /// A line was decoded but does not have the expected shape.
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// The builder rejected the record stream.
    #[error("index error: {0}")]
    Index(#[from] IndexError),
}
