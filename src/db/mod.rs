pub mod categories;
pub mod connection;
pub mod facilities;
pub mod statuses;

use crate::domain::facility::FacilityRecord;
use crate::domain::status::StatusEntry;
use crate::errors::ServerError;
use crate::query::pagination::PageSlice;
use crate::query::predicate::{Predicate, SortSpec};

/// Read-only query capability over the facility directory.
///
/// Handed to the query layer at construction so the core can be tested
/// against any backing implementation.
pub trait FacilityStore {
    fn count(&self, filter: &Predicate) -> Result<u64, ServerError>;
    fn page(
        &self,
        filter: &Predicate,
        sort: &SortSpec,
        slice: PageSlice,
    ) -> Result<Vec<FacilityRecord>, ServerError>;
    fn by_id(&self, id: i64) -> Result<Option<FacilityRecord>, ServerError>;
    /// Candidate set for proximity ranking.
    fn all(&self) -> Result<Vec<FacilityRecord>, ServerError>;
}

/// Latest-comment lookup, shared by every consumer so the
/// "most recent, tie-break by highest id" rule is applied uniformly.
pub trait StatusStore {
    fn current_for(&self, facility_id: i64) -> Result<Option<StatusEntry>, ServerError>;
}

pub trait CategoryStore {
    fn name_of(&self, category_id: i64) -> Result<Option<String>, ServerError>;
}
