//! # CSV Record Source
//!
//! Tokenizer for the apartment-transaction export published by MOLIT.
//!
//! ```text
//! "서울특별시 강남구 개포동","1234","1234","0000","개포자이","84.97","202001","15","150,000","5","2019","개포로 123"
//!  └ region sub-region [dong]                      └ complex  └ area   └ YYYYMM  └ day └ price  └ floor └ built └ road
//! ```
//!
//! Fields are double-quoted and joined by `",`, so the line is split on that
//! separator and each piece is stripped of quotes. A configurable number of
//! leading header lines is skipped before any decoding happens.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::decoder::Utf8Decoder;
use crate::domain::{DealSnapshot, IndexConfig, Record};
use crate::ports::{FieldDecoder, IngestError};
use crate::service::ingest;

/// Separator between quoted columns.
const COLUMN_SEPARATOR: &str = "\",";

/// Columns up to and including year-built are required; road is optional.
const REQUIRED_COLUMNS: usize = 11;

mod column {
    pub const LOCATION: usize = 0;
    pub const COMPLEX: usize = 4;
    pub const AREA_EXCLUSIVE: usize = 5;
    pub const YEAR_MONTH: usize = 6;
    pub const DAY: usize = 7;
    pub const PRICE: usize = 8;
    pub const FLOOR: usize = 9;
    pub const YEAR_BUILT: usize = 10;
    pub const ROAD: usize = 11;
}

/// CSV layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Leading lines to skip (default: 16, the MOLIT export preamble).
    pub header_lines: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self { header_lines: 16 }
    }
}

/// Streams [`Record`]s out of a line-oriented reader.
///
/// Yields at most one error; iteration ends after it.
pub struct CsvRecordSource<R, D = Utf8Decoder> {
    reader: R,
    decoder: D,
    header_lines: usize,
    line: usize,
    buf: Vec<u8>,
    done: bool,
}

impl CsvRecordSource<BufReader<File>, Utf8Decoder> {
    /// Open a UTF-8 export on disk.
    pub fn open(path: &Path, config: &CsvConfig) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), Utf8Decoder, config))
    }
}

impl<R: BufRead, D: FieldDecoder> CsvRecordSource<R, D> {
    pub fn new(reader: R, decoder: D, config: &CsvConfig) -> Self {
        Self {
            reader,
            decoder,
            header_lines: config.header_lines,
            line: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    /// 1-based number of the last physical line read.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Next non-blank data line, decoded.
    fn next_line(&mut self) -> Result<Option<String>, IngestError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            if self.line <= self.header_lines {
                continue;
            }

            let mut end = self.buf.len();
            while end > 0 && matches!(self.buf[end - 1], b'\n' | b'\r') {
                end -= 1;
            }
            let text = self
                .decoder
                .decode(&self.buf[..end])
                .map_err(|source| IngestError::Decode {
                    line: self.line,
                    source,
                })?;
            if !text.trim().is_empty() {
                return Ok(Some(text));
            }
        }
    }
}

impl<R: BufRead, D: FieldDecoder> Iterator for CsvRecordSource<R, D> {
    type Item = Result<Record, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.next_line() {
            Ok(None) => None,
            Ok(Some(text)) => Some(parse_line(&text).map_err(|reason| IngestError::Malformed {
                line: self.line,
                reason,
            })),
            Err(e) => Some(Err(e)),
        };
        self.done = !matches!(result, Some(Ok(_)));
        result
    }
}

/// Load and index an export file in one go.
pub fn ingest_csv(
    path: &Path,
    csv: &CsvConfig,
    index: IndexConfig,
) -> Result<DealSnapshot, IngestError> {
    let source = CsvRecordSource::open(path, csv)?;
    ingest(source, index)
}

/// Split one decoded line into a [`Record`].
pub fn parse_line(line: &str) -> Result<Record, String> {
    let columns: Vec<&str> = line.split(COLUMN_SEPARATOR).map(unquote).collect();
    if columns.len() < REQUIRED_COLUMNS {
        return Err(format!(
            "expected at least {} columns, found {}",
            REQUIRED_COLUMNS,
            columns.len()
        ));
    }

    let mut location = columns[column::LOCATION].split_whitespace();
    let region = location.next().ok_or("missing region")?;
    let sub_region = location.next().ok_or("missing sub-region")?;
    let dong = location.collect::<Vec<_>>().join(" ");

    let year_month: u32 = number("contract year-month", columns[column::YEAR_MONTH])?;
    let month = (year_month % 100) as u8;
    if !(1..=12).contains(&month) {
        return Err(format!("contract month {} out of range", month));
    }
    let year = u16::try_from(year_month / 100)
        .map_err(|_| format!("contract year in '{}' out of range", year_month))?;

    Ok(Record {
        region: region.to_owned(),
        sub_region: sub_region.to_owned(),
        dong,
        complex: columns[column::COMPLEX].to_owned(),
        area_exclusive: columns[column::AREA_EXCLUSIVE].to_owned(),
        year,
        month,
        day: number("contract day", columns[column::DAY])?,
        price: number("price", &columns[column::PRICE].replace(',', ""))?,
        floor: number("floor", columns[column::FLOOR])?,
        year_built: number("year built", columns[column::YEAR_BUILT])?,
        road: columns
            .get(column::ROAD)
            .map(|road| road.to_string())
            .unwrap_or_default(),
    })
}

fn unquote(field: &str) -> &str {
    field.trim().trim_matches('"')
}

fn number<T: FromStr>(name: &str, raw: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid {} '{}'", name, raw))
}
