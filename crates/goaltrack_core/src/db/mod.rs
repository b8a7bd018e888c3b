//! SQLite storage bootstrap for the goal tracker.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing the `goals` and
//!   `activities` collections.
//! - Create the schema on first open.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No goal/activity data is read or written before the schema is in place.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure opening or talking to the goal store file.
#[derive(Debug)]
pub enum DbError {
    /// Driver-level failure: open, pragma, statement or lock timeout.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; it is left untouched.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable code for `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite_failed",
            Self::UnsupportedSchemaVersion { .. } => "schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "goal store: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "goal store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Sqlite(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn codes_distinguish_driver_and_schema_failures() {
        let driver = DbError::from(rusqlite::Error::InvalidQuery);
        let schema = DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 1,
        };

        assert_eq!(driver.code(), "sqlite_failed");
        assert!(driver.source().is_some());
        assert_eq!(schema.code(), "schema_too_new");
        assert!(schema.source().is_none());
        assert!(schema.to_string().contains("newer than supported 1"));
    }
}
