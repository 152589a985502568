//! # Value Objects
//!
//! Immutable value objects for the deal range index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based position of a record in the record store.
///
/// Row ids are the only stable identifier a record has.
pub type RowId = usize;

/// Nesting level of a group in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Region,
    SubRegion,
    Complex,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region => write!(f, "region"),
            Self::SubRegion => write!(f, "sub-region"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

/// What the builder does when a group key shows up again after its group
/// was already closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Assume the input is grouped. A reappearing key replaces the earlier
    /// group and the earlier rows become unreachable through the index.
    #[default]
    Trust,
    /// Abort the load on the first reappearing key.
    Reject,
}

/// Configuration for building the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Handling of non-contiguous keys (default: trust the input).
    pub order_policy: OrderPolicy,
    /// Expected record count, used only to pre-allocate the record store.
    pub capacity_hint: Option<usize>,
}

impl IndexConfig {
    /// Strict configuration: reject non-contiguous keys.
    pub fn strict() -> Self {
        Self {
            order_policy: OrderPolicy::Reject,
            ..Self::default()
        }
    }
}
