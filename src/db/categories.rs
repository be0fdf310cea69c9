use crate::db::connection::Database;
use crate::db::CategoryStore;
use crate::domain::facility::Category;
use crate::errors::ServerError;
use rusqlite::{params, OptionalExtension};

/// SQLite-backed [`CategoryStore`].
pub struct SqliteCategoryStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteCategoryStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        SqliteCategoryStore { db }
    }

    /// All categories, alphabetically, for filter dropdowns.
    pub fn all(&self) -> Result<Vec<Category>, ServerError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM ecoCategories ORDER BY name")?;
            let rows = stmt.query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }
}

impl CategoryStore for SqliteCategoryStore<'_> {
    fn name_of(&self, category_id: i64) -> Result<Option<String>, ServerError> {
        self.db.with_conn(|conn| {
            let name = conn
                .query_row(
                    "SELECT name FROM ecoCategories WHERE id = ?1",
                    params![category_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(name)
        })
    }
}
