//! # Inbound Ports (Driving Ports)
//!
//! Query API exposed to adapters (HTTP gateway, method dispatch, CLI).

use std::collections::BTreeMap;

use crate::domain::{ComplexListing, IndexStats, LookupError, Record, RowId, RowSlice};

/// Read-only lookups over a frozen snapshot.
///
/// Every query that narrows below the region level takes a row id instead
/// of a group key. The key is re-derived from that row, so callers never
/// have to encode region or complex names.
///
/// Name maps point each group at a representative row id (the first row of
/// the group). Callers must not rely on their iteration order.
///
/// A group is only returned if its range contains the row it was reached
/// from; every narrowing query on a row lost to an overwrite fails with
/// `KeyNotFound`.
pub trait DealLookupApi: Send + Sync {
    /// All regions with the first row id of each.
    ///
    /// An empty index yields an empty map.
    fn list_regions(&self) -> BTreeMap<String, RowId>;

    /// Sub-regions of the region that row `row_id` belongs to.
    ///
    /// ## Errors
    ///
    /// - `RowOutOfRange`: `row_id` is not a valid row
    /// - `KeyNotFound`: the row's region is not indexed, or its group was
    ///   replaced by a later occurrence of the same key
    fn list_sub_regions(&self, row_id: RowId) -> Result<BTreeMap<String, RowId>, LookupError>;

    /// Complexes of the sub-region that row `row_id` belongs to, together
    /// with the row's region, sub-region and road name for display.
    fn list_complexes(&self, row_id: RowId) -> Result<ComplexListing, LookupError>;

    /// Every record of the complex that row `row_id` belongs to, in row order.
    fn resolve_complex_rows(&self, row_id: RowId) -> Result<RowSlice<'_>, LookupError>;

    /// Every record of the sub-region that row `row_id` belongs to, in row order.
    fn resolve_sub_region_rows(&self, row_id: RowId) -> Result<RowSlice<'_>, LookupError>;

    /// A single record.
    fn get_record(&self, row_id: RowId) -> Result<&Record, LookupError>;

    /// Record and group counts.
    fn stats(&self) -> IndexStats;
}
