//! UTF-8 implementation of [`FieldDecoder`].

use crate::ports::{DecodeError, FieldDecoder};

const BOM: char = '\u{feff}';

/// Strict UTF-8 decoder. Invalid sequences are errors; a leading BOM is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Decoder;

impl FieldDecoder for Utf8Decoder {
    fn decode(&self, raw: &[u8]) -> Result<String, DecodeError> {
        std::str::from_utf8(raw)
            .map(|text| text.trim_start_matches(BOM).to_owned())
            .map_err(|e| DecodeError {
                encoding: "UTF-8",
                offset: e.valid_up_to(),
            })
    }
}
