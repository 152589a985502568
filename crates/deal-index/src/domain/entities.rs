//! # Domain Entities
//!
//! Records, the record store, row ranges and the frozen three-level index.
//!
//! ```text
//! RangeIndex
//!  └── region ──────► RegionNode    { range, sub_regions }
//!       └── sub-region ─► SubRegionNode { range, complexes }
//!            └── complex ──► ComplexNode   { range }
//! ```
//!
//! Nodes only hold row ranges. Records never point back into the index; the
//! group of a row is always re-derived from the row's own key.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::value_objects::RowId;

/// One real-estate transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Province / metropolitan city.
    pub region: String,
    /// District (gu / si / gun).
    pub sub_region: String,
    /// Neighbourhood, display only. Not part of the group key.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dong: String,
    /// Apartment complex name.
    pub complex: String,
    /// Exclusive area in square metres, as published.
    pub area_exclusive: String,
    /// Contract year.
    pub year: u16,
    /// Contract month (1-12).
    pub month: u8,
    /// Contract day (1-31).
    pub day: u8,
    /// Price in units of 10,000 KRW.
    pub price: u32,
    /// Floor; negative for basement units.
    pub floor: i16,
    /// Year the building was completed.
    pub year_built: u16,
    /// Road-name address.
    pub road: String,
}

impl Record {
    /// Create a record carrying only its group key.
    pub fn keyed(
        region: impl Into<String>,
        sub_region: impl Into<String>,
        complex: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            sub_region: sub_region.into(),
            complex: complex.into(),
            ..Self::default()
        }
    }

    /// The (region, sub-region, complex) key of this record.
    pub fn key(&self) -> GroupKey<'_> {
        GroupKey {
            region: &self.region,
            sub_region: &self.sub_region,
            complex: &self.complex,
        }
    }
}

/// Borrowed three-level group key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey<'a> {
    pub region: &'a str,
    pub sub_region: &'a str,
    pub complex: &'a str,
}

/// Append-only, ordered sequence of records addressed by row id.
///
/// Only the builder appends; once frozen inside a [`DealSnapshot`] the store
/// is read-only.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a record, returning its row id.
    pub(crate) fn append(&mut self, record: Record) -> RowId {
        let row_id = self.records.len();
        self.records.push(record);
        row_id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `row_id`, if any.
    pub fn get(&self, row_id: RowId) -> Option<&Record> {
        self.records.get(row_id)
    }

    /// Records covered by `range`, or `None` if it runs past the end.
    pub fn slice(&self, range: Range) -> Option<&[Record]> {
        self.records.get(range.start..range.end)
    }

    /// Iterate `(row_id, record)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Record)> {
        self.records.iter().enumerate()
    }
}

/// Half-open row interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: RowId,
    pub end: RowId,
}

impl Range {
    pub fn new(start: RowId, end: RowId) -> Self {
        debug_assert!(start <= end, "range start {} past end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, row_id: RowId) -> bool {
        self.start <= row_id && row_id < self.end
    }
}

/// Leaf node: the rows of one complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexNode {
    range: Range,
}

impl ComplexNode {
    pub(crate) fn new(range: Range) -> Self {
        Self { range }
    }

    pub fn range(&self) -> Range {
        self.range
    }
}

/// The rows of one sub-region and the complexes inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRegionNode {
    range: Range,
    complexes: HashMap<String, ComplexNode>,
}

impl SubRegionNode {
    pub(crate) fn new(range: Range, complexes: HashMap<String, ComplexNode>) -> Self {
        Self { range, complexes }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn complex(&self, name: &str) -> Option<&ComplexNode> {
        self.complexes.get(name)
    }

    /// Complexes in unspecified order.
    pub fn complexes(&self) -> impl Iterator<Item = (&str, &ComplexNode)> {
        self.complexes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn complex_count(&self) -> usize {
        self.complexes.len()
    }
}

/// The rows of one region and the sub-regions inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionNode {
    range: Range,
    sub_regions: HashMap<String, SubRegionNode>,
}

impl RegionNode {
    pub(crate) fn new(range: Range, sub_regions: HashMap<String, SubRegionNode>) -> Self {
        Self { range, sub_regions }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn sub_region(&self, name: &str) -> Option<&SubRegionNode> {
        self.sub_regions.get(name)
    }

    /// Sub-regions in unspecified order.
    pub fn sub_regions(&self) -> impl Iterator<Item = (&str, &SubRegionNode)> {
        self.sub_regions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn sub_region_count(&self) -> usize {
        self.sub_regions.len()
    }
}

/// Frozen region → sub-region → complex index of row ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeIndex {
    regions: HashMap<String, RegionNode>,
}

impl RangeIndex {
    pub(crate) fn new(regions: HashMap<String, RegionNode>) -> Self {
        Self { regions }
    }

    pub fn region(&self, name: &str) -> Option<&RegionNode> {
        self.regions.get(name)
    }

    /// Regions in unspecified order.
    pub fn regions(&self) -> impl Iterator<Item = (&str, &RegionNode)> {
        self.regions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn sub_region_count(&self) -> usize {
        self.regions.values().map(RegionNode::sub_region_count).sum()
    }

    pub fn complex_count(&self) -> usize {
        self.regions
            .values()
            .flat_map(|r| r.sub_regions.values())
            .map(SubRegionNode::complex_count)
            .sum()
    }

    /// Range of the complex named by `key`, if indexed.
    pub fn complex_range(&self, key: GroupKey<'_>) -> Option<Range> {
        self.region(key.region)?
            .sub_region(key.sub_region)?
            .complex(key.complex)
            .map(ComplexNode::range)
    }
}

/// The frozen record store and its index, shared read-only by all queries.
#[derive(Debug, Clone, Default)]
pub struct DealSnapshot {
    records: RecordStore,
    index: RangeIndex,
}

impl DealSnapshot {
    pub(crate) fn new(records: RecordStore, index: RangeIndex) -> Self {
        Self { records, index }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn index(&self) -> &RangeIndex {
        &self.index
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.records.len(),
            regions: self.index.region_count(),
            sub_regions: self.index.sub_region_count(),
            complexes: self.index.complex_count(),
        }
    }
}

/// Size of a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub records: usize,
    pub regions: usize,
    pub sub_regions: usize,
    pub complexes: usize,
}

/// A contiguous run of records together with the row id of the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlice<'a> {
    pub start: RowId,
    pub records: &'a [Record],
}

impl<'a> RowSlice<'a> {
    pub fn range(&self) -> Range {
        Range::new(self.start, self.start + self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate `(row_id, record)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &'a Record)> + 'a {
        let (start, records) = (self.start, self.records);
        records
            .iter()
            .enumerate()
            .map(move |(i, r)| (start + i, r))
    }
}

/// Complexes of one sub-region, with the display fields of the referenced row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexListing {
    pub region: String,
    pub sub_region: String,
    pub road: String,
    pub complexes: std::collections::BTreeMap<String, RowId>,
}
