use crate::db::connection::Database;
use crate::db::FacilityStore;
use crate::domain::facility::FacilityRecord;
use crate::errors::ServerError;
use crate::query::pagination::PageSlice;
use crate::query::predicate::{Predicate, SortSpec};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const FACILITY_COLUMNS: &str =
    "id, title, category, description, houseNumber, streetName, town, county, postcode, lng, lat, contributor";

fn row_to_facility(row: &Row) -> rusqlite::Result<FacilityRecord> {
    Ok(FacilityRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        description: row.get(3)?,
        house_number: row.get(4)?,
        street_name: row.get(5)?,
        town: row.get(6)?,
        county: row.get(7)?,
        postcode: row.get(8)?,
        lng: row.get(9)?,
        lat: row.get(10)?,
        contributor: row.get(11)?,
    })
}

/// SQLite-backed [`FacilityStore`]. Every filtered query renders its
/// WHERE clause from the shared predicate tree, so count and page can
/// never apply different filter logic.
pub struct SqliteFacilityStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteFacilityStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        SqliteFacilityStore { db }
    }

    /// Distinct non-empty towns, for filter dropdowns.
    pub fn unique_towns(&self) -> Result<Vec<String>, ServerError> {
        self.distinct_column("town")
    }

    /// Distinct non-empty counties, for filter dropdowns.
    pub fn unique_counties(&self) -> Result<Vec<String>, ServerError> {
        self.distinct_column("county")
    }

    fn distinct_column(&self, column: &'static str) -> Result<Vec<String>, ServerError> {
        self.db.with_conn(|conn| {
            let sql = format!(
                "SELECT DISTINCT {column} FROM ecoFacilities \
                 WHERE {column} IS NOT NULL AND {column} != '' ORDER BY {column}"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }
}

impl FacilityStore for SqliteFacilityStore<'_> {
    fn count(&self, filter: &Predicate) -> Result<u64, ServerError> {
        let (where_clause, values) = filter.to_sql();
        self.db.with_conn(|conn| {
            let sql = format!("SELECT COUNT(*) FROM ecoFacilities WHERE {where_clause}");
            let count: i64 =
                conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    fn page(
        &self,
        filter: &Predicate,
        sort: &SortSpec,
        slice: PageSlice,
    ) -> Result<Vec<FacilityRecord>, ServerError> {
        let (where_clause, mut values) = filter.to_sql();
        values.push(Value::Integer(slice.limit as i64));
        values.push(Value::Integer(slice.offset as i64));

        self.db.with_conn(|conn| {
            let sql = format!(
                "SELECT {FACILITY_COLUMNS} FROM ecoFacilities WHERE {where_clause} \
                 ORDER BY {} LIMIT ? OFFSET ?",
                sort.order_by_clause()
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), row_to_facility)?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }

    fn by_id(&self, id: i64) -> Result<Option<FacilityRecord>, ServerError> {
        self.db.with_conn(|conn| {
            let sql = format!("SELECT {FACILITY_COLUMNS} FROM ecoFacilities WHERE id = ?1");
            let record = conn
                .query_row(&sql, params![id], row_to_facility)
                .optional()?;
            Ok(record)
        })
    }

    fn all(&self) -> Result<Vec<FacilityRecord>, ServerError> {
        self.db.with_conn(|conn| {
            let sql = format!("SELECT {FACILITY_COLUMNS} FROM ecoFacilities ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_facility)?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }
}
