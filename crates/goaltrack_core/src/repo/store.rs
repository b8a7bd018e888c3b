//! Store handle, repository errors and the transaction primitive.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::activity::ActivityId;
use crate::model::goal::GoalId;
use crate::model::validation::ValidationError;
use crate::repo::activity_repo::ActivityRepository;
use crate::repo::goal_repo::GoalRepository;
use log::warn;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(ValidationError),
    GoalNotFound(GoalId),
    ActivityNotFound(ActivityId),
    /// Connection schema is not the version this binary writes.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// A stored row cannot be turned into a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::ActivityNotFound(id) => write!(f, "activity not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "goal store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Runs a unit of work atomically across the goal and activity collections.
pub trait TransactionalStore {
    /// Runs `work` in one transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// A call made while a transaction is already open joins it, so the
    /// outermost caller decides the commit point.
    fn with_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;

    /// Runs read-only `work` against one consistent snapshot.
    ///
    /// Unlike [`TransactionalStore::with_transaction`] this takes no write
    /// lock, so it does not queue behind a writer on another connection.
    /// Nested calls join the open transaction the same way.
    fn with_read_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
}

/// Everything the goal service needs from a store.
pub trait TrackerStore: GoalRepository + ActivityRepository + TransactionalStore {}

impl<S> TrackerStore for S where S: GoalRepository + ActivityRepository + TransactionalStore {}

/// SQLite-backed goal/activity store over a migrated connection.
pub struct SqliteTrackerStore<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteTrackerStore<'conn> {
    /// Wraps a connection opened through [`crate::db::open_db`].
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema is missing or foreign.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = schema_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl TransactionalStore for SqliteTrackerStore<'_> {
    fn with_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        // IMMEDIATE takes the write lock up front so two coordinators cannot
        // both read the same weight total before either writes.
        self.run_in_transaction(TransactionBehavior::Immediate, work)
    }

    fn with_read_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        self.run_in_transaction(TransactionBehavior::Deferred, work)
    }
}

impl SqliteTrackerStore<'_> {
    fn run_in_transaction<T, E, F>(&self, behavior: TransactionBehavior, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        if !self.conn.is_autocommit() {
            return work(self);
        }

        let tx = Transaction::new_unchecked(self.conn, behavior).map_err(RepoError::from)?;
        match work(self) {
            Ok(value) => {
                tx.commit().map_err(RepoError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=tx_rollback module=repo status=error error_code=rollback_failed error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }
}
