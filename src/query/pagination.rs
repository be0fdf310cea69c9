use crate::db::FacilityStore;
use crate::domain::criteria::FilterCriteria;
use crate::domain::facility::{EnrichedFacility, FacilityRecord};
use crate::errors::ServerError;
use crate::query::predicate::FacetedQuery;
use serde::{Deserialize, Serialize};

/// LIMIT/OFFSET window for a page query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub limit: u32,
    pub offset: u64,
}

/// One fetched page of raw records with its paging metadata.
#[derive(Debug, Clone)]
pub struct PagedRecords {
    pub records: Vec<FacilityRecord>,
    pub total_matching: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

/// The API response shape: enriched rows plus paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub items: Vec<EnrichedFacility>,
    pub total_matching: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl PagedRecords {
    pub fn into_result_page(self, items: Vec<EnrichedFacility>) -> ResultPage {
        ResultPage {
            items,
            total_matching: self.total_matching,
            current_page: self.current_page,
            total_pages: self.total_pages,
            page_size: self.page_size,
        }
    }
}

/// Runs the count query and the page query for one set of criteria.
///
/// Both queries are built from the same [`FacetedQuery`], so they can
/// never disagree about which records match. A page past the end comes
/// back as an empty list with the metadata still correct.
pub struct PaginationCoordinator<'a> {
    store: &'a dyn FacilityStore,
}

impl<'a> PaginationCoordinator<'a> {
    pub fn new(store: &'a dyn FacilityStore) -> Self {
        PaginationCoordinator { store }
    }

    /// `ceil(total / page_size)`; zero only when nothing matches.
    pub fn total_pages(total_matching: u64, page_size: u32) -> u32 {
        if total_matching == 0 {
            0
        } else {
            ((total_matching + page_size as u64 - 1) / page_size as u64) as u32
        }
    }

    pub fn fetch_page(&self, criteria: &FilterCriteria) -> Result<PagedRecords, ServerError> {
        let query = FacetedQuery::from_criteria(criteria);

        let total_matching = self.store.count(&query.predicate)?;
        let total_pages = Self::total_pages(total_matching, criteria.page_size);

        let slice = PageSlice {
            limit: criteria.page_size,
            offset: (criteria.page.max(1) as u64 - 1) * criteria.page_size as u64,
        };
        let records = if total_matching == 0 || criteria.page > total_pages {
            Vec::new()
        } else {
            self.store.page(&query.predicate, &query.sort, slice)?
        };

        Ok(PagedRecords {
            records,
            total_matching,
            current_page: criteria.page,
            total_pages,
            page_size: criteria.page_size,
        })
    }
}
