mod applications;
mod categories;
mod opportunities;
mod organizations;
mod users;
mod volunteers;

use chrono::{DateTime, SecondsFormat, Utc};
use helperhub_types::codec::StringList;
use rusqlite::Row;
use rusqlite::types::Type;

use crate::error::TimestampError;

/// Timestamps are stored as RFC 3339 with nanoseconds so they read back
/// exactly as written.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|_| {
            // Rows written by SQLite's datetime('now') have no timezone.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|_| TimestampError(raw.to_string()))
}

pub(crate) fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn string_list_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<StringList> {
    let raw: String = row.get(idx)?;
    StringList::decode(raw.as_bytes())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_roundtrip_with_nanoseconds() {
        let now = Utc::now();
        assert_eq!(parse_timestamp(&format_timestamp(&now)).unwrap(), now);
    }

    #[test]
    fn parses_sqlite_datetime_format() {
        let ts = parse_timestamp("2024-03-01 12:30:00").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-01T12:30:00.000000000Z");
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(parse_timestamp("yesterday").is_err());
    }
}
