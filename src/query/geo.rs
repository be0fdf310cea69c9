use crate::domain::facility::FacilityRecord;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_NEARBY_LIMIT: usize = 10;

/// Great-circle distance between two coordinates, in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// A candidate together with its computed distance from the reference.
#[derive(Debug, Clone)]
pub struct RankedFacility {
    pub facility: FacilityRecord,
    pub distance_km: f64,
}

/// Keeps candidates strictly inside `radius_km` of the reference point,
/// ordered by ascending distance (ties by ascending id), capped at
/// `limit` results.
///
/// Independent of the faceted filters: callers can pass the whole
/// directory or an already-filtered candidate set.
pub fn rank_by_proximity(
    candidates: Vec<FacilityRecord>,
    lat: f64,
    lng: f64,
    radius_km: f64,
    limit: usize,
) -> Vec<RankedFacility> {
    let mut ranked: Vec<RankedFacility> = candidates
        .into_iter()
        .map(|facility| {
            let distance_km = haversine_km(lat, lng, facility.lat, facility.lng);
            RankedFacility {
                facility,
                distance_km,
            }
        })
        .filter(|r| r.distance_km < radius_km)
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then(a.facility.id.cmp(&b.facility.id))
    });
    ranked.truncate(limit);
    ranked
}

/// Valid coordinate ranges for a reference point.
pub fn valid_coordinates(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}
