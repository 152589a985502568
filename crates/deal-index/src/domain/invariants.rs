//! # Domain Invariants
//!
//! Structural checks over a frozen [`DealSnapshot`].
//!
//! With grouped input every check passes by construction. They exist to
//! detect input that broke the grouping precondition after a build in
//! [`OrderPolicy::Trust`](super::OrderPolicy::Trust) mode, and to back the
//! property tests.

use std::collections::HashSet;

use super::entities::{DealSnapshot, Range, RangeIndex, RecordStore};
use super::errors::InvariantViolation;
use super::value_objects::Level;

/// Invariant: children partition their parent's range with no gap or
/// overlap, at every level. Regions partition `[0, len)`.
pub fn invariant_partition(index: &RangeIndex, len: usize) -> Result<(), InvariantViolation> {
    check_partition(
        Level::Region,
        "<root>",
        Range::new(0, len),
        index.regions().map(|(k, r)| (k, r.range())),
    )?;

    for (region_key, region) in index.regions() {
        check_partition(
            Level::SubRegion,
            region_key,
            region.range(),
            region.sub_regions().map(|(k, s)| (k, s.range())),
        )?;

        for (sub_key, sub_region) in region.sub_regions() {
            check_partition(
                Level::Complex,
                sub_key,
                sub_region.range(),
                sub_region.complexes().map(|(k, c)| (k, c.range())),
            )?;
        }
    }
    Ok(())
}

/// Invariant: the last group at every level ends at the record count.
pub fn invariant_finalized(index: &RangeIndex, len: usize) -> Result<(), InvariantViolation> {
    let Some((region_key, region)) = index.regions().max_by_key(|(_, r)| r.range().start) else {
        return Ok(());
    };
    ensure_ends_at(Level::Region, region_key, region.range(), len)?;

    let Some((sub_key, sub_region)) = region.sub_regions().max_by_key(|(_, s)| s.range().start)
    else {
        return Ok(());
    };
    ensure_ends_at(Level::SubRegion, sub_key, sub_region.range(), len)?;

    if let Some((complex_key, complex)) =
        sub_region.complexes().max_by_key(|(_, c)| c.range().start)
    {
        ensure_ends_at(Level::Complex, complex_key, complex.range(), len)?;
    }
    Ok(())
}

/// Invariant: every row resolves, through its own key, to a complex range
/// that contains it, and every distinct key appears exactly once as a leaf.
pub fn invariant_resolvable(
    records: &RecordStore,
    index: &RangeIndex,
) -> Result<(), InvariantViolation> {
    let mut distinct = HashSet::new();
    for (row_id, record) in records.iter() {
        let key = record.key();
        let covered = index
            .complex_range(key)
            .is_some_and(|range| range.contains(row_id));
        if !covered {
            return Err(InvariantViolation::Unresolvable { row_id });
        }
        distinct.insert(key);
    }

    if distinct.len() != index.complex_count() {
        return Err(InvariantViolation::Incomplete {
            keys: distinct.len(),
            leaves: index.complex_count(),
        });
    }
    Ok(())
}

/// Run every invariant against a snapshot.
pub fn verify_snapshot(snapshot: &DealSnapshot) -> Result<(), InvariantViolation> {
    let len = snapshot.records().len();
    invariant_partition(snapshot.index(), len)?;
    invariant_finalized(snapshot.index(), len)?;
    invariant_resolvable(snapshot.records(), snapshot.index())
}

fn check_partition<'a>(
    level: Level,
    parent: &str,
    parent_range: Range,
    children: impl Iterator<Item = (&'a str, Range)>,
) -> Result<(), InvariantViolation> {
    let mut children: Vec<(&str, Range)> = children.collect();
    children.sort_by_key(|(_, range)| range.start);

    let violation = |detail: String| InvariantViolation::Partition {
        level,
        parent: parent.to_string(),
        detail,
    };

    let mut expected = parent_range.start;
    for (key, range) in children {
        if range.is_empty() {
            return Err(violation(format!("'{}' is empty", key)));
        }
        if range.start != expected {
            return Err(violation(format!(
                "'{}' starts at {}, expected {}",
                key, range.start, expected
            )));
        }
        expected = range.end;
    }

    if expected != parent_range.end {
        return Err(violation(format!(
            "children end at {}, parent ends at {}",
            expected, parent_range.end
        )));
    }
    Ok(())
}

fn ensure_ends_at(
    level: Level,
    key: &str,
    range: Range,
    len: usize,
) -> Result<(), InvariantViolation> {
    if range.end == len {
        Ok(())
    } else {
        Err(InvariantViolation::Unfinalized {
            level,
            key: key.to_string(),
            end: range.end,
            len,
        })
    }
}
