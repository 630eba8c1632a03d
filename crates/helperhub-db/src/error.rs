use helperhub_types::error::FormatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A unique column already holds the submitted value.
    #[error("{entity} with this {field} already exists")]
    Conflict { entity: &'static str, field: String },

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

/// A timestamp column that does not hold a parseable time.
#[derive(Debug, Error)]
#[error("invalid stored timestamp '{0}'")]
pub struct TimestampError(pub String);

impl DbError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DbError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        // Row mappers report codec failures as conversion errors; surface the
        // original cause instead of an opaque rusqlite error.
        match err {
            rusqlite::Error::FromSqlConversionFailure(idx, ty, source) => {
                let source = match source.downcast::<FormatError>() {
                    Ok(format) => return DbError::Format(*format),
                    Err(source) => source,
                };
                match source.downcast::<TimestampError>() {
                    Ok(ts) => DbError::Timestamp(*ts),
                    Err(source) => {
                        DbError::Sqlite(rusqlite::Error::FromSqlConversionFailure(idx, ty, source))
                    }
                }
            }
            other => DbError::Sqlite(other),
        }
    }
}

/// Map a failed INSERT/UPDATE, turning unique-constraint violations into
/// [`DbError::Conflict`].
pub(crate) fn write_error(entity: &'static str) -> impl Fn(rusqlite::Error) -> DbError {
    move |err| match unique_violation_field(&err) {
        Some(field) => DbError::Conflict { entity, field },
        None => err.into(),
    }
}

fn unique_violation_field(err: &rusqlite::Error) -> Option<String> {
    let rusqlite::Error::SqliteFailure(code, Some(message)) = err else {
        return None;
    };
    if code.code != rusqlite::ErrorCode::ConstraintViolation {
        return None;
    }
    // "UNIQUE constraint failed: volunteers.phone"
    let columns = message.strip_prefix("UNIQUE constraint failed: ")?;
    let first = columns.split(',').next()?.trim();
    let field = first.rsplit('.').next().unwrap_or(first);
    Some(field.to_string())
}
