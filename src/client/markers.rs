use crate::client::window::WindowView;
use crate::domain::facility::EnrichedFacility;

/// One pin on the map overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub facility_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub title: String,
}

/// Map-marker bookkeeping driven entirely by window notifications.
///
/// Subscribes to the [`SlidingWindowCache`](crate::client::window::SlidingWindowCache)
/// like any other view, so markers appear and disappear in the same
/// operation that changes the list.
#[derive(Debug, Default)]
pub struct MarkerOverlay {
    markers: Vec<Marker>,
}

impl MarkerOverlay {
    pub fn new() -> Self {
        MarkerOverlay::default()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn find(&self, facility_id: i64) -> Option<&Marker> {
        self.markers.iter().find(|m| m.facility_id == facility_id)
    }
}

impl WindowView for MarkerOverlay {
    fn items_appended(&mut self, items: &[EnrichedFacility]) {
        for item in items {
            self.markers.push(Marker {
                facility_id: item.id,
                lat: item.lat,
                lng: item.lng,
                title: item.title.clone(),
            });
        }
    }

    fn items_evicted(&mut self, ids: &[i64]) {
        self.markers.retain(|m| !ids.contains(&m.facility_id));
    }

    fn cleared(&mut self) {
        self.markers.clear();
    }
}
