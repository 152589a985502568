//! # Adapters Layer
//!
//! Secondary adapters for the deal index: text decoding, the CSV record
//! source and name-based method dispatch.

pub mod api_handler;
pub mod csv_source;
pub mod decoder;

pub use api_handler::{handle_api_query, ApiHandler, ApiQueryError, DealView};
pub use csv_source::{ingest_csv, parse_line, CsvConfig, CsvRecordSource};
pub use decoder::Utf8Decoder;
