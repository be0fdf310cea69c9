use crate::client::window::SlidingWindowCache;
use crate::domain::criteria::FilterCriteria;
use crate::query::pagination::ResultPage;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Quiescence delay between a filter edit and the fetch it triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Failure fetching or decoding a page.
#[derive(Debug)]
pub enum FetchError {
    Network(String),
    Server(u16),
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Server(status) => write!(f, "server returned status {status}"),
            FetchError::Decode(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Source of result pages. The HTTP client implements this; tests plug
/// in stubs or an in-process store-backed fetcher.
pub trait PageFetcher {
    fn fetch(&mut self, criteria: &FilterCriteria, page: u32) -> Result<ResultPage, FetchError>;
}

/// Controller phases. The error state is transient: a failure surfaces
/// its message and the controller is immediately idle again, ready to
/// retry the same page on the next trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Exhausted,
}

/// A request the caller should now perform. Its signature identifies
/// the criteria *and* page, so a late response can be recognized.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub criteria: FilterCriteria,
    pub page: u32,
    pub signature: String,
}

/// What a trigger decided.
#[derive(Debug)]
pub enum FetchDecision {
    /// Perform this fetch and hand the outcome to `apply_response`.
    Issue(FetchPlan),
    /// A request is already in flight; the trigger is coalesced into it.
    AlreadyLoading,
    /// No further pages exist for the current criteria.
    Exhausted,
    /// Filter edits have not gone quiet yet; trigger again later.
    Debounced,
}

/// Result of applying a fetch outcome.
#[derive(Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Items appended; `exhausted` reports whether this was the last page.
    Appended { added: usize, exhausted: bool },
    /// User-visible message; same page will be retried on the next trigger.
    Failed(String),
    /// Response no longer matches the current criteria; dropped.
    Stale,
}

/// Drives sequential page fetches for one view.
///
/// Enforces the single-in-flight gate, deduplicates identical requests,
/// debounces filter-triggered fetches, resets fully on criteria change
/// and discards late responses issued under previous criteria. Fetched
/// items land in the owned [`SlidingWindowCache`].
pub struct IncrementalResultController {
    criteria: FilterCriteria,
    phase: Phase,
    next_page: u32,
    total_pages: u32,
    total_matching: u64,
    window: SlidingWindowCache,
    debounce: Duration,
    quiet_until: Option<Instant>,
    in_flight: Option<String>,
    last_error: Option<String>,
}

fn request_signature(criteria: &FilterCriteria, page: u32) -> String {
    format!("{}&page={page}", criteria.signature())
}

impl IncrementalResultController {
    pub fn new(criteria: FilterCriteria, window: SlidingWindowCache) -> Self {
        Self::with_debounce(criteria, window, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(
        criteria: FilterCriteria,
        window: SlidingWindowCache,
        debounce: Duration,
    ) -> Self {
        IncrementalResultController {
            criteria,
            phase: Phase::Idle,
            next_page: 1,
            total_pages: 0,
            total_matching: 0,
            window,
            debounce,
            quiet_until: None,
            in_flight: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_matching(&self) -> u64 {
        self.total_matching
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn window(&self) -> &SlidingWindowCache {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut SlidingWindowCache {
        &mut self.window
    }

    /// Message from the most recent failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Applies new criteria. A real change is a full restart: retained
    /// items are cleared, paging starts over at page 1, and the debounce
    /// clock is armed. Re-applying identical criteria is a no-op.
    pub fn set_criteria(&mut self, criteria: FilterCriteria, now: Instant) {
        if criteria.signature() == self.criteria.signature() {
            return;
        }

        debug!(signature = %criteria.signature(), "criteria changed, resetting scroll state");
        self.criteria = criteria;
        self.phase = Phase::Idle;
        self.next_page = 1;
        self.total_pages = 0;
        self.total_matching = 0;
        self.window.clear();
        self.quiet_until = Some(now + self.debounce);
        // Any response to the outstanding request is now stale.
        self.in_flight = None;
        self.last_error = None;
    }

    /// A fetch trigger: scroll-near-bottom, filter change or initial
    /// mount. Decides whether a request should be issued right now.
    pub fn trigger(&mut self, now: Instant) -> FetchDecision {
        match self.phase {
            Phase::Loading => return FetchDecision::AlreadyLoading,
            Phase::Exhausted => return FetchDecision::Exhausted,
            Phase::Idle => {}
        }

        if let Some(deadline) = self.quiet_until {
            if now < deadline {
                return FetchDecision::Debounced;
            }
            self.quiet_until = None;
        }

        let plan = FetchPlan {
            criteria: self.criteria.clone(),
            page: self.next_page,
            signature: request_signature(&self.criteria, self.next_page),
        };
        self.phase = Phase::Loading;
        self.in_flight = Some(plan.signature.clone());
        FetchDecision::Issue(plan)
    }

    /// Consumes the outcome of a previously issued plan.
    ///
    /// A response whose signature no longer matches the outstanding
    /// request (the criteria changed while it was in flight) is
    /// discarded without touching any state.
    pub fn apply_response(
        &mut self,
        plan: &FetchPlan,
        result: Result<ResultPage, FetchError>,
    ) -> ApplyOutcome {
        if self.in_flight.as_deref() != Some(plan.signature.as_str()) {
            warn!(signature = %plan.signature, "discarding stale response");
            return ApplyOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                self.total_pages = page.total_pages;
                self.total_matching = page.total_matching;
                self.last_error = None;

                let added = page.items.len();
                let last_page = page.items.is_empty() || page.current_page >= page.total_pages;
                self.window.append(page.items);

                if last_page {
                    self.phase = Phase::Exhausted;
                } else {
                    self.phase = Phase::Idle;
                    self.next_page = page.current_page + 1;
                }
                ApplyOutcome::Appended {
                    added,
                    exhausted: last_page,
                }
            }
            Err(e) => {
                // Error state, then immediately back to idle; the same
                // page is retried on the next trigger.
                warn!(page = plan.page, error = %e, "page fetch failed");
                self.phase = Phase::Idle;
                let message = "An error occurred while loading facilities".to_string();
                self.last_error = Some(message.clone());
                ApplyOutcome::Failed(message)
            }
        }
    }

    /// Trigger-fetch-apply in one call, for callers that block on the
    /// fetch anyway. Returns `None` when no request was issued.
    pub fn pump<F: PageFetcher>(&mut self, fetcher: &mut F, now: Instant) -> Option<ApplyOutcome> {
        match self.trigger(now) {
            FetchDecision::Issue(plan) => {
                let result = fetcher.fetch(&plan.criteria, plan.page);
                Some(self.apply_response(&plan, result))
            }
            _ => None,
        }
    }
}
