use crate::client::controller::{
    ApplyOutcome, FetchDecision, FetchError, IncrementalResultController, PageFetcher, Phase,
};
use crate::client::window::SlidingWindowCache;
use crate::db::categories::SqliteCategoryStore;
use crate::db::connection::Database;
use crate::db::facilities::SqliteFacilityStore;
use crate::db::statuses::SqliteStatusStore;
use crate::domain::criteria::{FilterCriteria, PageBounds};
use crate::query::enrich::StatusAggregator;
use crate::query::pagination::{PaginationCoordinator, ResultPage};
use crate::tests::utils::{enriched, insert_facility, make_db, SeedFacility};
use std::collections::HashMap;
use std::time::{Duration, Instant};

fn criteria(pairs: &[(&str, &str)]) -> FilterCriteria {
    let params: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    FilterCriteria::from_query(&params, PageBounds::default())
}

fn page(current: u32, total_pages: u32, total_matching: u64, ids: std::ops::Range<i64>) -> ResultPage {
    ResultPage {
        items: ids.map(|i| enriched(i, &format!("item {i}"))).collect(),
        total_matching,
        current_page: current,
        total_pages,
        page_size: 10,
    }
}

/// Serves a fixed page sequence and counts calls.
struct StubFetcher {
    pages: Vec<ResultPage>,
    calls: usize,
}

impl StubFetcher {
    fn new(pages: Vec<ResultPage>) -> Self {
        StubFetcher { pages, calls: 0 }
    }
}

impl PageFetcher for StubFetcher {
    fn fetch(&mut self, _criteria: &FilterCriteria, page: u32) -> Result<ResultPage, FetchError> {
        self.calls += 1;
        self.pages
            .get(page as usize - 1)
            .cloned()
            .ok_or_else(|| FetchError::Server(404))
    }
}

struct FailingFetcher {
    calls: usize,
}

impl PageFetcher for FailingFetcher {
    fn fetch(&mut self, _criteria: &FilterCriteria, _page: u32) -> Result<ResultPage, FetchError> {
        self.calls += 1;
        Err(FetchError::Network("connection refused".into()))
    }
}

fn controller(c: FilterCriteria) -> IncrementalResultController {
    IncrementalResultController::with_debounce(
        c,
        SlidingWindowCache::new(100),
        Duration::from_millis(300),
    )
}

#[test]
fn initial_trigger_fetches_page_one() {
    let mut ctl = controller(criteria(&[]));
    let now = Instant::now();

    match ctl.trigger(now) {
        FetchDecision::Issue(plan) => {
            assert_eq!(plan.page, 1);
            assert!(ctl.is_loading());
        }
        other => panic!("expected a fetch, got {other:?}"),
    }
}

#[test]
fn duplicate_triggers_while_loading_produce_one_request() {
    let mut ctl = controller(criteria(&[]));
    let now = Instant::now();

    let plan = match ctl.trigger(now) {
        FetchDecision::Issue(plan) => plan,
        other => panic!("expected a fetch, got {other:?}"),
    };

    // Bursty scroll events while the request is outstanding.
    assert!(matches!(ctl.trigger(now), FetchDecision::AlreadyLoading));
    assert!(matches!(ctl.trigger(now), FetchDecision::AlreadyLoading));

    let outcome = ctl.apply_response(&plan, Ok(page(1, 2, 15, 0..10)));
    assert_eq!(
        outcome,
        ApplyOutcome::Appended {
            added: 10,
            exhausted: false
        }
    );
    assert_eq!(ctl.next_page(), 2);
    assert_eq!(ctl.window().len(), 10);
}

#[test]
fn last_page_and_empty_page_both_exhaust() {
    let mut ctl = controller(criteria(&[]));
    let now = Instant::now();

    let plan = match ctl.trigger(now) {
        FetchDecision::Issue(p) => p,
        other => panic!("unexpected {other:?}"),
    };
    ctl.apply_response(&plan, Ok(page(1, 1, 5, 0..5)));
    assert!(ctl.is_exhausted());
    assert_eq!(ctl.window().len(), 5, "last page items are still appended");

    // Further triggers are ignored.
    assert!(matches!(ctl.trigger(now), FetchDecision::Exhausted));

    // An empty page exhausts too.
    let mut ctl = controller(criteria(&[]));
    let plan = match ctl.trigger(now) {
        FetchDecision::Issue(p) => p,
        other => panic!("unexpected {other:?}"),
    };
    ctl.apply_response(&plan, Ok(page(1, 0, 0, 0..0)));
    assert!(ctl.is_exhausted());
}

#[test]
fn failure_surfaces_a_message_and_retries_the_same_page() {
    let mut ctl = controller(criteria(&[]));
    let mut fetcher = FailingFetcher { calls: 0 };
    let now = Instant::now();

    match ctl.pump(&mut fetcher, now) {
        Some(ApplyOutcome::Failed(message)) => {
            assert!(!message.is_empty());
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(ctl.phase(), Phase::Idle, "error state is transient");
    assert_eq!(ctl.next_page(), 1, "no page skipped or double-counted");
    assert!(ctl.last_error().is_some());
    assert!(ctl.window().is_empty(), "retained state untouched on failure");

    // The next trigger retries page 1.
    let mut ok_fetcher = StubFetcher::new(vec![page(1, 1, 3, 0..3)]);
    assert!(matches!(
        ctl.pump(&mut ok_fetcher, now),
        Some(ApplyOutcome::Appended { added: 3, .. })
    ));
    assert!(ctl.last_error().is_none());
}

#[test]
fn filter_change_resets_state_and_debounces() {
    let mut ctl = controller(criteria(&[]));
    let t0 = Instant::now();

    let mut fetcher = StubFetcher::new(vec![page(1, 3, 25, 0..10)]);
    ctl.pump(&mut fetcher, t0);
    assert_eq!(ctl.window().len(), 10);
    assert_eq!(ctl.next_page(), 2);

    ctl.set_criteria(criteria(&[("searchTerm", "pond")]), t0);
    assert_eq!(ctl.next_page(), 1);
    assert!(ctl.window().is_empty(), "full restart, no stale merge");
    assert_eq!(ctl.total_pages(), 0);

    // Rapid successive edits collapse into one request after quiescence.
    assert!(matches!(
        ctl.trigger(t0 + Duration::from_millis(100)),
        FetchDecision::Debounced
    ));
    match ctl.trigger(t0 + Duration::from_millis(301)) {
        FetchDecision::Issue(plan) => assert_eq!(plan.page, 1),
        other => panic!("expected fetch after quiescence, got {other:?}"),
    }
}

#[test]
fn reapplying_identical_criteria_does_not_reset() {
    let mut ctl = controller(criteria(&[("searchTerm", "park")]));
    let t0 = Instant::now();

    let mut fetcher = StubFetcher::new(vec![page(1, 2, 12, 0..10)]);
    ctl.pump(&mut fetcher, t0);
    assert_eq!(ctl.window().len(), 10);

    ctl.set_criteria(criteria(&[("searchTerm", "park")]), t0);
    assert_eq!(ctl.window().len(), 10);
    assert_eq!(ctl.next_page(), 2);
}

#[test]
fn late_response_for_old_criteria_is_discarded() {
    let mut ctl = controller(criteria(&[("searchTerm", "park")]));
    let t0 = Instant::now();

    let stale_plan = match ctl.trigger(t0) {
        FetchDecision::Issue(p) => p,
        other => panic!("unexpected {other:?}"),
    };

    // Filters change while the request is in flight.
    ctl.set_criteria(criteria(&[("searchTerm", "pond")]), t0);

    let outcome = ctl.apply_response(&stale_plan, Ok(page(1, 3, 25, 0..10)));
    assert_eq!(outcome, ApplyOutcome::Stale);
    assert!(ctl.window().is_empty(), "stale items never applied");
    assert_eq!(ctl.next_page(), 1);
    assert!(!ctl.is_loading());
}

/// Fetches straight from the stores, exercising the whole pipeline:
/// predicate, pagination, enrichment, controller and window together.
struct StoreFetcher<'a> {
    db: &'a Database,
    calls: usize,
}

impl PageFetcher for StoreFetcher<'_> {
    fn fetch(&mut self, c: &FilterCriteria, page: u32) -> Result<ResultPage, FetchError> {
        self.calls += 1;

        let facilities = SqliteFacilityStore::new(self.db);
        let statuses = SqliteStatusStore::new(self.db);
        let categories = SqliteCategoryStore::new(self.db);

        let mut wanted = c.clone();
        wanted.page = page;

        let mut paged = PaginationCoordinator::new(&facilities)
            .fetch_page(&wanted)
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let records = std::mem::take(&mut paged.records);
        let items = StatusAggregator::new(&statuses, &categories).enrich(records);
        Ok(paged.into_result_page(items))
    }
}

#[test]
fn scrolling_to_exhaustion_against_a_real_store() {
    let db = make_db("controller_store");
    for i in 0..25 {
        insert_facility(
            &db,
            &SeedFacility {
                title: format!("Park {i:02}"),
                ..Default::default()
            },
        );
    }

    let mut fetcher = StoreFetcher { db: &db, calls: 0 };
    let mut ctl = IncrementalResultController::with_debounce(
        criteria(&[("searchTerm", "park"), ("limit", "10")]),
        SlidingWindowCache::new(12),
        Duration::from_millis(0),
    );

    let now = Instant::now();
    while !ctl.is_exhausted() {
        ctl.pump(&mut fetcher, now).expect("a fetch should be issued");
    }

    assert_eq!(fetcher.calls, 3);
    assert_eq!(ctl.total_matching(), 25);
    assert_eq!(ctl.total_pages(), 3);

    // Window kept only the most recent 12 of the 25, in sort order.
    assert_eq!(ctl.window().len(), 12);
    let titles: Vec<String> = ctl
        .window()
        .retained()
        .map(|i| i.title.clone())
        .collect();
    assert_eq!(titles.first().map(String::as_str), Some("Park 13"));
    assert_eq!(titles.last().map(String::as_str), Some("Park 24"));
}
