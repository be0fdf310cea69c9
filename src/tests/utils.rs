use crate::db::connection::{init_db, Database};
use crate::domain::facility::{EnrichedFacility, FacilityRecord};
use crate::domain::status::MAX_COMMENT_LEN;
use rusqlite::params;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns a fresh test database using the production schema.
pub fn make_db(tag: &str) -> Database {
    let path = std::env::temp_dir().join(format!(
        "ecofinder_{tag}_{}.sqlite",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let db = Database::new(path);
    init_db(&db, "sql/schema.sql").expect("Failed to initialize DB");
    db
}

pub fn insert_category(db: &Database, name: &str) -> i64 {
    db.with_conn(|conn| {
        conn.execute("INSERT INTO ecoCategories (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    })
    .unwrap()
}

/// Facility seed with workable defaults; override what the test needs.
#[derive(Clone)]
pub struct SeedFacility {
    pub title: String,
    pub category: i64,
    pub description: String,
    pub house_number: Option<String>,
    pub street_name: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
    pub postcode: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl Default for SeedFacility {
    fn default() -> Self {
        SeedFacility {
            title: "Facility".into(),
            category: 1,
            description: String::new(),
            house_number: None,
            street_name: None,
            town: None,
            county: None,
            postcode: None,
            lat: 52.0,
            lng: -1.0,
        }
    }
}

pub fn insert_facility(db: &Database, seed: &SeedFacility) -> i64 {
    db.with_conn(|conn| {
        // The schema's foreign key on `category` is enforced by the bundled
        // SQLite, so make sure the referenced category row exists.
        conn.execute(
            "INSERT OR IGNORE INTO ecoCategories (id, name) \
             VALUES (?1, printf('Category %d', ?1))",
            params![seed.category],
        )?;
        conn.execute(
            "INSERT INTO ecoFacilities \
             (title, category, description, houseNumber, streetName, town, county, postcode, lng, lat, contributor) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0)",
            params![
                seed.title,
                seed.category,
                seed.description,
                seed.house_number,
                seed.street_name,
                seed.town,
                seed.county,
                seed.postcode,
                seed.lng,
                seed.lat,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
    .unwrap()
}

/// `timestamp` in `YYYY-MM-DD HH:MM:SS` form.
pub fn insert_status(
    db: &Database,
    facility_id: i64,
    user_id: i64,
    comment: &str,
    timestamp: &str,
) -> i64 {
    // Comments are stored at no more than MAX_COMMENT_LEN characters.
    let comment: String = comment.chars().take(MAX_COMMENT_LEN).collect();
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO ecoFacilityStatus (facilityId, userId, statusComment, timestamp) \
             VALUES (?1, ?2, ?3, ?4)",
            params![facility_id, user_id, comment, timestamp],
        )?;
        Ok(conn.last_insert_rowid())
    })
    .unwrap()
}

/// In-memory facility record for tests that do not touch the database.
pub fn record(id: i64, title: &str) -> FacilityRecord {
    FacilityRecord {
        id,
        title: title.into(),
        category: 1,
        description: String::new(),
        house_number: None,
        street_name: None,
        town: None,
        county: None,
        postcode: None,
        lat: 52.0,
        lng: -1.0,
        contributor: 0,
    }
}

pub fn enriched(id: i64, title: &str) -> EnrichedFacility {
    EnrichedFacility::from_record(record(id, title), None, None)
}
