//! Additive schema management.
//!
//! Every entity table is described by a [`TableDef`]. [`ensure_schema`]
//! compares those definitions with what the database holds and only ever
//! adds: missing tables, missing columns, missing unique indexes. Nothing is
//! dropped or narrowed, so running it against an up-to-date database is a
//! no-op.

use std::collections::HashSet;

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    /// A `JsonList` encoded as JSON text.
    Json,
    /// RFC 3339 text.
    Timestamp,
}

impl ColumnKind {
    fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Text | ColumnKind::Json | ColumnKind::Timestamp => "TEXT",
        }
    }

    /// Backfill for rows that predate a column added later.
    fn zero_value(self) -> &'static str {
        match self {
            ColumnKind::Integer => "0",
            ColumnKind::Text => "''",
            ColumnKind::Json => "'[]'",
            ColumnKind::Timestamp => "'1970-01-01T00:00:00Z'",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub unique: bool,
}

const fn col(name: &'static str, kind: ColumnKind) -> ColumnDef {
    ColumnDef {
        name,
        kind,
        unique: false,
    }
}

const fn unique(name: &'static str, kind: ColumnKind) -> ColumnDef {
    ColumnDef {
        name,
        kind,
        unique: true,
    }
}

/// A table with an implicit `id INTEGER PRIMARY KEY AUTOINCREMENT` column.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

use ColumnKind::{Integer, Json, Text, Timestamp};

pub const USERS: TableDef = TableDef {
    name: "users",
    columns: &[
        unique("email", Text),
        col("password_hash", Text),
        col("full_name", Text),
        col("role", Text),
        col("identity_id", Text),
        col("created_at", Timestamp),
        col("updated_at", Timestamp),
    ],
};

pub const VOLUNTEERS: TableDef = TableDef {
    name: "volunteers",
    columns: &[
        unique("email", Text),
        col("password_hash", Text),
        col("name", Text),
        unique("phone", Text),
        col("location", Text),
        col("bio", Text),
        col("category_list", Json),
        col("available_hours", Integer),
        col("created_at", Timestamp),
        col("updated_at", Timestamp),
    ],
};

pub const ORGANIZATIONS: TableDef = TableDef {
    name: "organizations",
    columns: &[
        unique("email", Text),
        col("password_hash", Text),
        unique("name", Text),
        col("phone", Text),
        col("location", Text),
        col("description", Text),
        col("website_url", Text),
        col("created_at", Timestamp),
        col("updated_at", Timestamp),
    ],
};

pub const CATEGORIES: TableDef = TableDef {
    name: "categories",
    columns: &[unique("category", Text), col("created_at", Timestamp)],
};

pub const OPPORTUNITIES: TableDef = TableDef {
    name: "opportunities",
    columns: &[
        col("organization_email", Text),
        col("category", Text),
        col("title", Text),
        col("description", Text),
        col("location", Text),
        col("hours_required", Timestamp),
        col("created_at", Timestamp),
        col("updated_at", Timestamp),
    ],
};

pub const APPLICATIONS: TableDef = TableDef {
    name: "applications",
    columns: &[
        col("volunteer_id", Integer),
        col("opportunity_id", Integer),
        col("status", Text),
        col("cover_letter", Text),
        col("created_at", Timestamp),
        col("updated_at", Timestamp),
    ],
};

/// Every entity table, in creation order.
pub const TABLES: &[TableDef] = &[
    USERS,
    VOLUNTEERS,
    ORGANIZATIONS,
    CATEGORIES,
    OPPORTUNITIES,
    APPLICATIONS,
];

/// What a schema check changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub tables_created: Vec<String>,
    /// `table.column`
    pub columns_added: Vec<String>,
    pub indexes_created: Vec<String>,
}

impl SchemaReport {
    pub fn is_unchanged(&self) -> bool {
        self.tables_created.is_empty()
            && self.columns_added.is_empty()
            && self.indexes_created.is_empty()
    }
}

/// Bring `tables` into the database, additively, in one transaction.
pub fn ensure_schema(conn: &Connection, tables: &[TableDef]) -> Result<SchemaReport> {
    let tx = conn.unchecked_transaction()?;
    let mut report = SchemaReport::default();

    for table in tables {
        if table_exists(&tx, table.name)? {
            let existing = existing_columns(&tx, table.name)?;
            for column in table.columns.iter().filter(|c| !existing.contains(c.name)) {
                tx.execute_batch(&format!(
                    "ALTER TABLE {} ADD COLUMN {} {} NOT NULL DEFAULT {};",
                    table.name,
                    column.name,
                    column.kind.sql_type(),
                    column.kind.zero_value()
                ))?;
                report
                    .columns_added
                    .push(format!("{}.{}", table.name, column.name));
            }
        } else {
            tx.execute_batch(&create_table_sql(table))?;
            report.tables_created.push(table.name.to_string());
        }

        for column in table.columns.iter().filter(|c| c.unique) {
            let index = format!("ux_{}_{}", table.name, column.name);
            if !index_exists(&tx, &index)? {
                tx.execute_batch(&format!(
                    "CREATE UNIQUE INDEX {} ON {}({});",
                    index, table.name, column.name
                ))?;
                report.indexes_created.push(index);
            }
        }
    }

    tx.commit()?;

    if report.is_unchanged() {
        debug!("Database schema up to date");
    } else {
        info!(
            "Database schema updated: {} tables created, {} columns added, {} indexes created",
            report.tables_created.len(),
            report.columns_added.len(),
            report.indexes_created.len()
        );
    }

    Ok(report)
}

fn create_table_sql(table: &TableDef) -> String {
    let mut columns = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    columns.extend(
        table
            .columns
            .iter()
            .map(|c| format!("{} {} NOT NULL", c.name, c.kind.sql_type())),
    );
    format!(
        "CREATE TABLE {} (\n    {}\n);",
        table.name,
        columns.join(",\n    ")
    )
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn index_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1",
            [name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn existing_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(names)
}
