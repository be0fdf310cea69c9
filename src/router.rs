use crate::db::categories::SqliteCategoryStore;
use crate::db::connection::Database;
use crate::db::facilities::SqliteFacilityStore;
use crate::db::statuses::SqliteStatusStore;
use crate::db::FacilityStore;
use crate::domain::criteria::{FilterCriteria, PageBounds};
use crate::domain::facility::{Category, EnrichedFacility};
use crate::errors::{ResultResp, ServerError};
use crate::query::enrich::StatusAggregator;
use crate::query::geo;
use crate::query::pagination::PaginationCoordinator;
use crate::query::predicate::Predicate;
use crate::responses::json_response;
use astra::Request;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

pub fn handle(req: Request, db: &Database, bounds: PageBounds) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let params = parse_query(&req);

    debug!(%method, %path, "request");

    match (method.as_str(), path.as_str()) {
        ("GET", "/api/facilities") => search_facilities(db, &params, bounds),
        ("GET", "/api/facilities/nearby") => nearby_facilities(db, &params),
        ("GET", "/api/filters") => filter_options(db),
        ("GET", p) => match p.strip_prefix("/api/facilities/") {
            Some(rest) if !rest.is_empty() && !rest.contains('/') => {
                let id = rest
                    .parse::<i64>()
                    .map_err(|_| ServerError::BadRequest("Invalid facility ID".into()))?;
                facility_by_id(db, id)
            }
            _ => Err(ServerError::NotFound),
        },
        _ => Err(ServerError::NotFound),
    }
}

/// Faceted search with sorted pagination.
fn search_facilities(
    db: &Database,
    params: &HashMap<String, String>,
    bounds: PageBounds,
) -> ResultResp {
    let criteria = FilterCriteria::from_query(params, bounds);

    let facilities = SqliteFacilityStore::new(db);
    let statuses = SqliteStatusStore::new(db);
    let categories = SqliteCategoryStore::new(db);

    let mut paged = PaginationCoordinator::new(&facilities).fetch_page(&criteria)?;
    let aggregator = StatusAggregator::new(&statuses, &categories);

    let records = std::mem::take(&mut paged.records);
    let items = aggregator.enrich(records);
    json_response(200, &paged.into_result_page(items))
}

#[derive(Serialize)]
struct NearbyResponse {
    items: Vec<EnrichedFacility>,
}

/// Proximity query: facilities strictly inside `radius` km of the
/// reference point, nearest first.
fn nearby_facilities(db: &Database, params: &HashMap<String, String>) -> ResultResp {
    let lat = parse_float(params, "lat")
        .ok_or_else(|| ServerError::BadRequest("lat and lng are required".into()))?;
    let lng = parse_float(params, "lng")
        .ok_or_else(|| ServerError::BadRequest("lat and lng are required".into()))?;
    if !geo::valid_coordinates(lat, lng) {
        return Err(ServerError::BadRequest("coordinates out of range".into()));
    }

    // Malformed or non-positive values degrade to the defaults.
    let radius = parse_float(params, "radius")
        .filter(|r| *r > 0.0)
        .unwrap_or(geo::DEFAULT_RADIUS_KM);
    let limit = params
        .get("limit")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(geo::DEFAULT_NEARBY_LIMIT);

    let facilities = SqliteFacilityStore::new(db);
    let statuses = SqliteStatusStore::new(db);
    let categories = SqliteCategoryStore::new(db);
    let aggregator = StatusAggregator::new(&statuses, &categories);

    let candidates = facilities.all()?;
    let items = geo::rank_by_proximity(candidates, lat, lng, radius, limit)
        .into_iter()
        .map(|ranked| {
            let mut item = aggregator.enrich_one(ranked.facility);
            item.distance_km = Some(ranked.distance_km);
            item
        })
        .collect();

    json_response(200, &NearbyResponse { items })
}

fn facility_by_id(db: &Database, id: i64) -> ResultResp {
    let facilities = SqliteFacilityStore::new(db);
    let statuses = SqliteStatusStore::new(db);
    let categories = SqliteCategoryStore::new(db);

    let record = facilities.by_id(id)?.ok_or(ServerError::NotFound)?;
    let item = StatusAggregator::new(&statuses, &categories).enrich_one(record);
    json_response(200, &item)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterOptions {
    categories: Vec<Category>,
    towns: Vec<String>,
    counties: Vec<String>,
    total_facilities: u64,
}

/// Data for building the filter controls: every category, the distinct
/// towns and counties, and the unfiltered total.
fn filter_options(db: &Database) -> ResultResp {
    let facilities = SqliteFacilityStore::new(db);
    let categories = SqliteCategoryStore::new(db);

    let options = FilterOptions {
        categories: categories.all()?,
        towns: facilities.unique_towns()?,
        counties: facilities.unique_counties()?,
        total_facilities: facilities.count(&Predicate::All(Vec::new()))?,
    };
    json_response(200, &options)
}

fn parse_float(params: &HashMap<String, String>, key: &str) -> Option<f64> {
    params
        .get(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    match req.uri().query() {
        Some(q) => url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect(),
        None => HashMap::new(),
    }
}
