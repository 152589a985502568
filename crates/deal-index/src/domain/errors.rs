//! # Domain Errors
//!
//! Error types for building and querying the deal range index.
//!
//! - [`IndexError`]: structural problems found while building; these abort the load.
//! - [`LookupError`]: per-query failures; these never affect other queries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value_objects::{Level, RowId};

/// Errors raised while building the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// A group key reappeared after its group was closed (strict mode only).
    #[error("{level} '{key}' reappears at row {row_id} after its group was closed")]
    OutOfOrder {
        level: Level,
        key: String,
        row_id: RowId,
    },
}

/// Errors returned by lookup operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Row id outside `[0, len)`.
    #[error("row {row_id} is out of range (records: {len})")]
    RowOutOfRange { row_id: RowId, len: usize },

    /// The key derived from a row has no entry at the given level.
    #[error("{level} '{key}' is not indexed")]
    KeyNotFound { level: Level, key: String },
}

impl LookupError {
    /// Both variants mean "nothing here" to an external caller.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RowOutOfRange { .. } | Self::KeyNotFound { .. }
        )
    }
}

/// A structural invariant of a frozen index does not hold.
///
/// Only possible when the input broke the grouping precondition and the
/// builder ran with [`OrderPolicy::Trust`](super::OrderPolicy::Trust).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Children of `parent` leave rows uncovered or cover rows twice.
    #[error("{level} groups under '{parent}' do not partition its range: {detail}")]
    Partition {
        level: Level,
        parent: String,
        detail: String,
    },

    /// The last group at a level does not end at the record count.
    #[error("last {level} '{key}' ends at {end}, expected {len}")]
    Unfinalized {
        level: Level,
        key: String,
        end: RowId,
        len: usize,
    },

    /// A row's own key does not lead back to a range containing it.
    #[error("row {row_id} does not resolve to its own complex")]
    Unresolvable { row_id: RowId },

    /// The index holds a different number of complexes than the records
    /// have distinct keys.
    #[error("{keys} distinct complex keys but {leaves} indexed complexes")]
    Incomplete { keys: usize, leaves: usize },
}

/// Serializable lookup error for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupErrorPayload {
    pub error_type: LookupErrorType,
    pub message: String,
    pub row_id: Option<RowId>,
}

/// Error type enumeration for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupErrorType {
    RowOutOfRange,
    KeyNotFound,
}

impl From<&LookupError> for LookupErrorPayload {
    fn from(err: &LookupError) -> Self {
        match err {
            LookupError::RowOutOfRange { row_id, .. } => Self {
                error_type: LookupErrorType::RowOutOfRange,
                message: err.to_string(),
                row_id: Some(*row_id),
            },
            LookupError::KeyNotFound { .. } => Self {
                error_type: LookupErrorType::KeyNotFound,
                message: err.to_string(),
                row_id: None,
            },
        }
    }
}
