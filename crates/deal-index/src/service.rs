//! # Lookup Service
//!
//! [`DealLookupApi`] over a shared, frozen [`DealSnapshot`], plus the
//! [`ingest`] pipeline that produces the snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{
    ComplexListing, DealSnapshot, IndexConfig, IndexStats, Level, LookupError, Range,
    RangeIndexBuilder, Record, RegionNode, RowId, RowSlice, SubRegionNode,
};
use crate::ports::{DealLookupApi, IngestError};

/// Drive a record source through the builder.
///
/// The first error aborts the load; no partial snapshot is returned.
pub fn ingest<I>(source: I, config: IndexConfig) -> Result<DealSnapshot, IngestError>
where
    I: IntoIterator<Item = Result<Record, IngestError>>,
{
    info!(order_policy = ?config.order_policy, "Ingesting records");
    let mut builder = RangeIndexBuilder::new(config);
    for record in source {
        builder.push(record?)?;
    }
    Ok(builder.finish())
}

/// Lookup service over a shared snapshot.
///
/// Cloning is cheap; all clones read the same snapshot.
#[derive(Debug, Clone)]
pub struct DealLookupService {
    snapshot: Arc<DealSnapshot>,
}

impl DealLookupService {
    pub fn new(snapshot: Arc<DealSnapshot>) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &DealSnapshot {
        &self.snapshot
    }

    fn record(&self, row_id: RowId) -> Result<&Record, LookupError> {
        self.snapshot
            .records()
            .get(row_id)
            .ok_or(LookupError::RowOutOfRange {
                row_id,
                len: self.snapshot.records().len(),
            })
    }

    /// Region node of `record`, provided its range still covers `row_id`.
    ///
    /// In `Trust` mode a reappearing key replaces the earlier group, so the
    /// node found by key may belong to a later occurrence.
    fn region_of(&self, row_id: RowId, record: &Record) -> Result<&RegionNode, LookupError> {
        self.snapshot
            .index()
            .region(&record.region)
            .filter(|node| node.range().contains(row_id))
            .ok_or_else(|| LookupError::KeyNotFound {
                level: Level::Region,
                key: record.region.clone(),
            })
    }

    fn sub_region_of(&self, row_id: RowId, record: &Record) -> Result<&SubRegionNode, LookupError> {
        self.region_of(row_id, record)?
            .sub_region(&record.sub_region)
            .filter(|node| node.range().contains(row_id))
            .ok_or_else(|| LookupError::KeyNotFound {
                level: Level::SubRegion,
                key: record.sub_region.clone(),
            })
    }

    fn rows(&self, range: Range) -> RowSlice<'_> {
        // Ranges come from the same snapshot, so they are always in bounds.
        let records = self.snapshot.records().slice(range).unwrap_or(&[]);
        RowSlice {
            start: range.start,
            records,
        }
    }
}

impl DealLookupApi for DealLookupService {
    fn list_regions(&self) -> BTreeMap<String, RowId> {
        self.snapshot
            .index()
            .regions()
            .map(|(name, node)| (name.to_owned(), node.range().start))
            .collect()
    }

    fn list_sub_regions(&self, row_id: RowId) -> Result<BTreeMap<String, RowId>, LookupError> {
        let record = self.record(row_id)?;
        let region = self.region_of(row_id, record)?;
        debug!(row_id, region = %record.region, "Listing sub-regions");
        Ok(region
            .sub_regions()
            .map(|(name, node)| (name.to_owned(), node.range().start))
            .collect())
    }

    fn list_complexes(&self, row_id: RowId) -> Result<ComplexListing, LookupError> {
        let record = self.record(row_id)?;
        let sub_region = self.sub_region_of(row_id, record)?;
        debug!(
            row_id,
            region = %record.region,
            sub_region = %record.sub_region,
            "Listing complexes"
        );
        Ok(ComplexListing {
            region: record.region.clone(),
            sub_region: record.sub_region.clone(),
            road: record.road.clone(),
            complexes: sub_region
                .complexes()
                .map(|(name, node)| (name.to_owned(), node.range().start))
                .collect(),
        })
    }

    fn resolve_complex_rows(&self, row_id: RowId) -> Result<RowSlice<'_>, LookupError> {
        let record = self.record(row_id)?;
        let complex = self
            .sub_region_of(row_id, record)?
            .complex(&record.complex)
            .filter(|node| node.range().contains(row_id))
            .ok_or_else(|| LookupError::KeyNotFound {
                level: Level::Complex,
                key: record.complex.clone(),
            })?;
        Ok(self.rows(complex.range()))
    }

    fn resolve_sub_region_rows(&self, row_id: RowId) -> Result<RowSlice<'_>, LookupError> {
        let record = self.record(row_id)?;
        let sub_region = self.sub_region_of(row_id, record)?;
        Ok(self.rows(sub_region.range()))
    }

    fn get_record(&self, row_id: RowId) -> Result<&Record, LookupError> {
        self.record(row_id)
    }

    fn stats(&self) -> IndexStats {
        self.snapshot.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(region: &str, sub_region: &str, complex: &str, road: &str) -> Record {
        Record {
            road: road.to_string(),
            ..Record::keyed(region, sub_region, complex)
        }
    }

    fn service() -> DealLookupService {
        let snapshot = DealSnapshot::build(
            vec![
                record("A", "1", "X", "road-x"),
                record("A", "1", "X", "road-x"),
                record("A", "1", "Y", "road-y"),
                record("A", "2", "Z", "road-z"),
                record("B", "1", "W", "road-w"),
            ],
            IndexConfig::default(),
        )
        .unwrap();
        DealLookupService::new(Arc::new(snapshot))
    }

    #[test]
    fn test_list_regions() {
        let regions = service().list_regions();
        assert_eq!(
            regions,
            BTreeMap::from([("A".to_string(), 0), ("B".to_string(), 4)])
        );
    }

    #[test]
    fn test_list_regions_empty_index() {
        let service = DealLookupService::new(Arc::new(DealSnapshot::default()));
        assert!(service.list_regions().is_empty());
        assert_eq!(service.stats(), IndexStats::default());
    }

    #[test]
    fn test_list_sub_regions_via_any_row_of_region() {
        let service = service();
        let expected = BTreeMap::from([("1".to_string(), 0), ("2".to_string(), 3)]);

        for row_id in 0..4 {
            assert_eq!(service.list_sub_regions(row_id).unwrap(), expected);
        }
        assert_eq!(
            service.list_sub_regions(4).unwrap(),
            BTreeMap::from([("1".to_string(), 4)])
        );
    }

    #[test]
    fn test_list_sub_regions_out_of_range() {
        assert_eq!(
            service().list_sub_regions(5),
            Err(LookupError::RowOutOfRange { row_id: 5, len: 5 })
        );
    }

    #[test]
    fn test_list_complexes_carries_display_fields() {
        let listing = service().list_complexes(2).unwrap();
        assert_eq!(listing.region, "A");
        assert_eq!(listing.sub_region, "1");
        assert_eq!(listing.road, "road-y");
        assert_eq!(
            listing.complexes,
            BTreeMap::from([("X".to_string(), 0), ("Y".to_string(), 2)])
        );
    }

    #[test]
    fn test_resolve_complex_rows_single_row() {
        let service = service();
        let slice = service.resolve_complex_rows(2).unwrap();
        assert_eq!(slice.range(), Range::new(2, 3));
        assert_eq!(slice.records[0].complex, "Y");
    }

    #[test]
    fn test_resolve_complex_rows_from_any_member() {
        let service = service();
        let first = service.resolve_complex_rows(0).unwrap();
        let second = service.resolve_complex_rows(1).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_resolve_sub_region_rows() {
        let service = service();
        let slice = service.resolve_sub_region_rows(1).unwrap();
        assert_eq!(slice.range(), Range::new(0, 3));
        assert!(slice.iter().all(|(_, r)| r.sub_region == "1" && r.region == "A"));
    }

    #[test]
    fn test_get_record() {
        let service = service();
        assert_eq!(service.get_record(3).unwrap().complex, "Z");
        assert!(service.get_record(99).unwrap_err().is_not_found());
    }

    fn overwritten(keys: &[(&str, &str, &str)]) -> DealLookupService {
        let snapshot = DealSnapshot::build(
            keys.iter().map(|(r, s, c)| Record::keyed(*r, *s, *c)),
            IndexConfig::default(),
        )
        .unwrap();
        DealLookupService::new(Arc::new(snapshot))
    }

    #[test]
    fn test_overwritten_sub_region_reports_key_not_found_for_lost_rows() {
        // Row 0 opens sub-region 1, which is later replaced by row 2.
        let service = overwritten(&[("A", "1", "X"), ("A", "2", "Y"), ("A", "1", "Z")]);
        let missing = LookupError::KeyNotFound {
            level: Level::SubRegion,
            key: "1".to_string(),
        };

        assert_eq!(service.resolve_complex_rows(0), Err(missing.clone()));
        assert_eq!(service.resolve_sub_region_rows(0), Err(missing.clone()));
        assert_eq!(service.list_complexes(0), Err(missing));
        assert_eq!(
            service.resolve_sub_region_rows(2).unwrap().range(),
            Range::new(2, 3)
        );
    }

    #[test]
    fn test_reappearing_key_does_not_resolve_to_later_occurrence() {
        // Same key as row 0; the index now points at row 2 only.
        let service = overwritten(&[("A", "1", "X"), ("A", "2", "Y"), ("A", "1", "X")]);

        assert!(matches!(
            service.resolve_complex_rows(0),
            Err(LookupError::KeyNotFound { .. })
        ));
        assert!(matches!(
            service.resolve_sub_region_rows(0),
            Err(LookupError::KeyNotFound { .. })
        ));
        assert_eq!(
            service.resolve_complex_rows(2).unwrap().range(),
            Range::new(2, 3)
        );
    }

    #[test]
    fn test_overwritten_complex_reports_key_not_found() {
        let service = overwritten(&[("A", "1", "X"), ("A", "1", "Y"), ("A", "1", "X")]);

        assert_eq!(
            service.resolve_complex_rows(0),
            Err(LookupError::KeyNotFound {
                level: Level::Complex,
                key: "X".to_string(),
            })
        );
        // The sub-region itself was never replaced.
        assert_eq!(service.resolve_sub_region_rows(0).unwrap().len(), 3);
        assert_eq!(
            service.list_complexes(0).unwrap().complexes,
            BTreeMap::from([("X".to_string(), 2), ("Y".to_string(), 1)])
        );
    }

    #[test]
    fn test_overwritten_region_reports_key_not_found_for_listings() {
        let service = overwritten(&[("A", "1", "X"), ("B", "1", "X"), ("A", "1", "X")]);
        let missing = LookupError::KeyNotFound {
            level: Level::Region,
            key: "A".to_string(),
        };

        assert_eq!(service.list_sub_regions(0), Err(missing.clone()));
        assert_eq!(service.list_complexes(0), Err(missing));
        assert!(service.list_sub_regions(1).is_ok());
        assert!(service.list_sub_regions(2).is_ok());
    }

    #[test]
    fn test_ingest_stops_on_first_error() {
        let source = vec![
            Ok(Record::keyed("A", "1", "X")),
            Err(IngestError::Malformed {
                line: 2,
                reason: "bad".to_string(),
            }),
            Ok(Record::keyed("A", "1", "Y")),
        ];
        let err = ingest(source, IndexConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_ingest_builds_snapshot() {
        let source = vec![
            Ok(Record::keyed("A", "1", "X")),
            Ok(Record::keyed("A", "1", "Y")),
        ];
        let snapshot = ingest(source, IndexConfig::default()).unwrap();
        assert_eq!(snapshot.stats().complexes, 2);
    }
}
