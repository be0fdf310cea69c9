use crate::db::{CategoryStore, StatusStore};
use crate::domain::facility::{EnrichedFacility, FacilityRecord};
use tracing::warn;

/// Joins the current status comment and category name onto page rows.
///
/// A failed lookup for one record must never abort the page: the row is
/// kept and simply carries no status (or category name), with the error
/// logged.
pub struct StatusAggregator<'a> {
    statuses: &'a dyn StatusStore,
    categories: &'a dyn CategoryStore,
}

impl<'a> StatusAggregator<'a> {
    pub fn new(statuses: &'a dyn StatusStore, categories: &'a dyn CategoryStore) -> Self {
        StatusAggregator {
            statuses,
            categories,
        }
    }

    pub fn enrich(&self, records: Vec<FacilityRecord>) -> Vec<EnrichedFacility> {
        records.into_iter().map(|r| self.enrich_one(r)).collect()
    }

    pub fn enrich_one(&self, record: FacilityRecord) -> EnrichedFacility {
        let status = match self.statuses.current_for(record.id) {
            Ok(status) => status,
            Err(e) => {
                warn!(facility_id = record.id, error = %e, "status lookup failed, row kept without status");
                None
            }
        };

        let category_name = match self.categories.name_of(record.category) {
            Ok(name) => name,
            Err(e) => {
                warn!(facility_id = record.id, category = record.category, error = %e, "category lookup failed");
                None
            }
        };

        EnrichedFacility::from_record(record, category_name, status)
    }
}
