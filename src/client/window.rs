use crate::domain::facility::EnrichedFacility;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub const DEFAULT_MAX_ITEMS: usize = 100;

/// A companion view kept in lockstep with the cache: a list renderer, a
/// map-marker layer, anything that displays the retained items. Views
/// are notified inside the same append/clear operation, so none of them
/// can keep a reference to an evicted item.
pub trait WindowView {
    fn items_appended(&mut self, items: &[EnrichedFacility]);
    fn items_evicted(&mut self, ids: &[i64]);
    fn cleared(&mut self);
}

// Lets a caller keep a handle to a view after registering it.
impl<V: WindowView> WindowView for Rc<RefCell<V>> {
    fn items_appended(&mut self, items: &[EnrichedFacility]) {
        self.borrow_mut().items_appended(items);
    }

    fn items_evicted(&mut self, ids: &[i64]) {
        self.borrow_mut().items_evicted(ids);
    }

    fn cleared(&mut self) {
        self.borrow_mut().cleared();
    }
}

/// Bounded FIFO retention for incrementally loaded results.
///
/// Appending past `max_items` evicts exactly the overflow from the
/// front, oldest first. A batch no larger than `max_items` never loses
/// its own items; only when a single batch exceeds the whole window
/// does eviction reach into the batch's oldest entries, keeping the
/// most-recently-appended `max_items` in original order.
pub struct SlidingWindowCache {
    max_items: usize,
    items: VecDeque<EnrichedFacility>,
    views: Vec<Box<dyn WindowView>>,
}

impl SlidingWindowCache {
    pub fn new(max_items: usize) -> Self {
        assert!(max_items > 0, "window must hold at least one item");
        SlidingWindowCache {
            max_items,
            items: VecDeque::new(),
            views: Vec::new(),
        }
    }

    pub fn register_view(&mut self, view: Box<dyn WindowView>) {
        self.views.push(view);
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn retained(&self) -> impl Iterator<Item = &EnrichedFacility> {
        self.items.iter()
    }

    /// Appends a batch, evicting the overflow. Returns the evicted ids.
    pub fn append(&mut self, batch: Vec<EnrichedFacility>) -> Vec<i64> {
        if batch.is_empty() {
            return Vec::new();
        }

        for view in &mut self.views {
            view.items_appended(&batch);
        }
        self.items.extend(batch);

        let mut evicted = Vec::new();
        while self.items.len() > self.max_items {
            // unwrap is safe: max_items > 0, so the deque is non-empty here
            let old = self.items.pop_front().unwrap();
            evicted.push(old.id);
        }
        if !evicted.is_empty() {
            for view in &mut self.views {
                view.items_evicted(&evicted);
            }
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.items.clear();
        for view in &mut self.views {
            view.cleared();
        }
    }
}
