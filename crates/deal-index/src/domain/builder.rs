//! # Range-Index Builder
//!
//! Single forward pass over grouped records producing a [`DealSnapshot`].
//!
//! ## Algorithm
//!
//! The builder keeps a cursor with the currently open region, sub-region and
//! complex. Each open group owns a [`PendingRange`] whose end is not known
//! yet, and the open region/sub-region own the map of children that have
//! already closed.
//!
//! For every incoming row `i` the cursor finds the highest level whose key
//! changed, looking top-down:
//!
//! ```text
//! region changed      → close complex, sub-region, region at i; open all three at i
//! sub-region changed  → close complex, sub-region at i;         open both at i
//! complex changed     → close complex at i;                     open it at i
//! nothing changed     → no index mutation
//! ```
//!
//! A closed group is moved into its parent's child map. [`finish`] closes
//! whatever is still open at the record count, so no pending end survives
//! into the frozen [`RangeIndex`].
//!
//! [`finish`]: RangeIndexBuilder::finish

use std::collections::HashMap;
use std::mem;

use tracing::{debug, info, warn};

use super::entities::{
    ComplexNode, DealSnapshot, Range, RangeIndex, Record, RecordStore, RegionNode, SubRegionNode,
};
use super::errors::IndexError;
use super::value_objects::{IndexConfig, Level, OrderPolicy, RowId};

/// A range whose end has not been observed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRange {
    start: RowId,
}

impl PendingRange {
    fn open(start: RowId) -> Self {
        Self { start }
    }

    fn close(self, end: RowId) -> Range {
        Range::new(self.start, end)
    }
}

#[derive(Debug)]
struct OpenComplex {
    key: String,
    pending: PendingRange,
}

impl OpenComplex {
    fn open(key: &str, at: RowId) -> Self {
        Self {
            key: key.to_owned(),
            pending: PendingRange::open(at),
        }
    }
}

#[derive(Debug)]
struct OpenSubRegion {
    key: String,
    pending: PendingRange,
    complexes: HashMap<String, ComplexNode>,
}

impl OpenSubRegion {
    fn open(key: &str, at: RowId) -> Self {
        Self {
            key: key.to_owned(),
            pending: PendingRange::open(at),
            complexes: HashMap::new(),
        }
    }

    fn close(self, end: RowId) -> (String, SubRegionNode) {
        (
            self.key,
            SubRegionNode::new(self.pending.close(end), self.complexes),
        )
    }
}

#[derive(Debug)]
struct OpenRegion {
    key: String,
    pending: PendingRange,
    sub_regions: HashMap<String, SubRegionNode>,
}

impl OpenRegion {
    fn open(key: &str, at: RowId) -> Self {
        Self {
            key: key.to_owned(),
            pending: PendingRange::open(at),
            sub_regions: HashMap::new(),
        }
    }

    fn close(self, end: RowId) -> (String, RegionNode) {
        let range = self.pending.close(end);
        debug!(
            region = %self.key,
            start = range.start,
            end = range.end,
            sub_regions = self.sub_regions.len(),
            "Region closed"
        );
        (self.key, RegionNode::new(range, self.sub_regions))
    }
}

/// The three groups that are open at the current row.
#[derive(Debug)]
struct Cursor {
    region: OpenRegion,
    sub_region: OpenSubRegion,
    complex: OpenComplex,
}

impl Cursor {
    fn open(record: &Record, at: RowId) -> Self {
        Self {
            region: OpenRegion::open(&record.region, at),
            sub_region: OpenSubRegion::open(&record.sub_region, at),
            complex: OpenComplex::open(&record.complex, at),
        }
    }

    /// Highest level whose key differs from `record`, evaluated top-down.
    fn changed_level(&self, record: &Record) -> Option<Level> {
        if self.region.key != record.region {
            Some(Level::Region)
        } else if self.sub_region.key != record.sub_region {
            Some(Level::SubRegion)
        } else if self.complex.key != record.complex {
            Some(Level::Complex)
        } else {
            None
        }
    }

    /// Whether the group `record` opens at `level` was already closed once.
    fn is_reopening(
        &self,
        level: Level,
        record: &Record,
        regions: &HashMap<String, RegionNode>,
    ) -> bool {
        match level {
            Level::Region => regions.contains_key(&record.region),
            Level::SubRegion => self.region.sub_regions.contains_key(&record.sub_region),
            Level::Complex => self.sub_region.complexes.contains_key(&record.complex),
        }
    }

    /// Close every group from the complex up to `level` at `at`, then open
    /// the groups of `record` at `at`.
    fn advance(
        &mut self,
        level: Level,
        record: &Record,
        at: RowId,
        regions: &mut HashMap<String, RegionNode>,
    ) {
        let complex = mem::replace(&mut self.complex, OpenComplex::open(&record.complex, at));
        self.sub_region
            .complexes
            .insert(complex.key, ComplexNode::new(complex.pending.close(at)));

        if level == Level::Complex {
            return;
        }

        let sub_region = mem::replace(
            &mut self.sub_region,
            OpenSubRegion::open(&record.sub_region, at),
        );
        let (key, node) = sub_region.close(at);
        self.region.sub_regions.insert(key, node);

        if level == Level::SubRegion {
            return;
        }

        let region = mem::replace(&mut self.region, OpenRegion::open(&record.region, at));
        let (key, node) = region.close(at);
        regions.insert(key, node);
    }

    /// Close all three open groups at `end`.
    fn close_all(self, end: RowId, regions: &mut HashMap<String, RegionNode>) {
        let Cursor {
            mut region,
            mut sub_region,
            complex,
        } = self;

        sub_region
            .complexes
            .insert(complex.key, ComplexNode::new(complex.pending.close(end)));
        let (key, node) = sub_region.close(end);
        region.sub_regions.insert(key, node);
        let (key, node) = region.close(end);
        regions.insert(key, node);
    }
}

/// Incremental builder for a [`DealSnapshot`].
///
/// Records must arrive grouped by (region, sub-region, complex). See the
/// module docs for the transition rules and [`OrderPolicy`] for what happens
/// when they are not.
#[derive(Debug)]
pub struct RangeIndexBuilder {
    config: IndexConfig,
    store: RecordStore,
    regions: HashMap<String, RegionNode>,
    cursor: Option<Cursor>,
    reopened: usize,
}

impl RangeIndexBuilder {
    /// Create a builder.
    pub fn new(config: IndexConfig) -> Self {
        let store = match config.capacity_hint {
            Some(capacity) => RecordStore::with_capacity(capacity),
            None => RecordStore::new(),
        };
        Self {
            config,
            store,
            regions: HashMap::new(),
            cursor: None,
            reopened: 0,
        }
    }

    /// Number of records pushed so far.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Groups that were replaced by a later, non-contiguous occurrence.
    pub fn reopened_groups(&self) -> usize {
        self.reopened
    }

    /// Append one record and update the index.
    ///
    /// ## Errors
    ///
    /// `IndexError::OutOfOrder` under [`OrderPolicy::Reject`] when the record
    /// reopens a closed group. The builder is left unchanged in that case.
    pub fn push(&mut self, record: Record) -> Result<RowId, IndexError> {
        let row_id = self.store.len();

        match self.cursor.as_mut() {
            None => self.cursor = Some(Cursor::open(&record, row_id)),
            Some(cursor) => {
                if let Some(level) = cursor.changed_level(&record) {
                    if cursor.is_reopening(level, &record, &self.regions) {
                        let key = match level {
                            Level::Region => &record.region,
                            Level::SubRegion => &record.sub_region,
                            Level::Complex => &record.complex,
                        };
                        match self.config.order_policy {
                            OrderPolicy::Reject => {
                                return Err(IndexError::OutOfOrder {
                                    level,
                                    key: key.clone(),
                                    row_id,
                                });
                            }
                            OrderPolicy::Trust => {
                                warn!(
                                    %level,
                                    key = %key,
                                    row_id,
                                    "Group reappears after it was closed; earlier rows are replaced"
                                );
                                self.reopened += 1;
                            }
                        }
                    }
                    cursor.advance(level, &record, row_id, &mut self.regions);
                }
            }
        }

        Ok(self.store.append(record))
    }

    /// Push every record from `records`, stopping at the first error.
    pub fn extend<I>(&mut self, records: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = Record>,
    {
        for record in records {
            self.push(record)?;
        }
        Ok(())
    }

    /// Close all open groups at the record count and freeze the result.
    pub fn finish(mut self) -> DealSnapshot {
        let end = self.store.len();
        if let Some(cursor) = self.cursor.take() {
            cursor.close_all(end, &mut self.regions);
        }

        let snapshot = DealSnapshot::new(self.store, RangeIndex::new(self.regions));
        let stats = snapshot.stats();
        info!(
            records = stats.records,
            regions = stats.regions,
            sub_regions = stats.sub_regions,
            complexes = stats.complexes,
            reopened = self.reopened,
            "Range index built"
        );
        snapshot
    }
}

impl DealSnapshot {
    /// Build a snapshot from grouped records in one pass.
    pub fn build<I>(records: I, config: IndexConfig) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut builder = RangeIndexBuilder::new(config);
        builder.extend(records)?;
        Ok(builder.finish())
    }
}
