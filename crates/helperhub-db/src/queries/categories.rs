use chrono::Utc;
use helperhub_types::models::Category;
use rusqlite::{Row, params};

use super::{format_timestamp, timestamp_at};
use crate::error::write_error;
use crate::{Database, Result};

const ENTITY: &str = "category";

impl Database {
    pub fn create_category(&self, category: &str) -> Result<Category> {
        let created_at = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO categories (category, created_at) VALUES (?1, ?2)",
                params![category, format_timestamp(&created_at)],
            )
            .map_err(write_error(ENTITY))?;

            Ok(Category {
                id: conn.last_insert_rowid(),
                category: category.to_string(),
                created_at,
            })
        })
    }

    /// Every category, oldest first.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, category, created_at FROM categories ORDER BY id")?;
            let rows = stmt
                .query_map([], category_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        category: row.get(1)?,
        created_at: timestamp_at(row, 2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbError;

    #[test]
    fn duplicate_category_is_a_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.create_category("Food").unwrap();

        let err = db.create_category("Food").unwrap_err();
        assert!(matches!(err, DbError::Conflict { ref field, .. } if field == "category"));
    }

    #[test]
    fn list_returns_all_in_creation_order() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.list_categories().unwrap().is_empty());

        let food = db.create_category("Food").unwrap();
        db.create_category("Education").unwrap();

        let names: Vec<String> = db
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(names, ["Food", "Education"]);
        assert_eq!(db.list_categories().unwrap()[0], food);
    }
}
