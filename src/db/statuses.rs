use crate::db::connection::Database;
use crate::db::StatusStore;
use crate::domain::status::StatusEntry;
use crate::errors::ServerError;
use rusqlite::{params, OptionalExtension};

/// SQLite-backed [`StatusStore`].
pub struct SqliteStatusStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteStatusStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        SqliteStatusStore { db }
    }
}

impl StatusStore for SqliteStatusStore<'_> {
    fn current_for(&self, facility_id: i64) -> Result<Option<StatusEntry>, ServerError> {
        self.db.with_conn(|conn| {
            // Most recent timestamp wins, ties broken by highest id.
            let entry = conn
                .query_row(
                    "SELECT id, facilityId, userId, statusComment, timestamp \
                     FROM ecoFacilityStatus WHERE facilityId = ?1 \
                     ORDER BY timestamp DESC, id DESC LIMIT 1",
                    params![facility_id],
                    |row| {
                        Ok(StatusEntry {
                            id: row.get(0)?,
                            facility_id: row.get(1)?,
                            user_id: row.get(2)?,
                            comment: row.get(3)?,
                            timestamp: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(entry)
        })
    }
}
