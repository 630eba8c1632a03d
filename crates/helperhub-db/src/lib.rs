pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

pub use error::DbError;
pub use migrations::SchemaReport;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Process-wide handle to the relational store.
///
/// Constructed once at startup and handed to the HTTP layer; every store call
/// goes through the single connection guarded by the mutex.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::bootstrap(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    /// In-memory store with the full schema, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;

        migrations::ensure_schema(&conn, migrations::TABLES)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Re-run the additive schema check against the entity tables.
    pub fn ensure_schema(&self) -> Result<SchemaReport> {
        self.with_conn(|conn| migrations::ensure_schema(conn, migrations::TABLES))
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&mut conn)
    }
}
