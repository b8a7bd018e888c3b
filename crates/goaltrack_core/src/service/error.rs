//! Errors surfaced by the goal service.

use crate::model::activity::ActivityId;
use crate::model::goal::GoalId;
use crate::model::validation::ValidationError;
use crate::repo::store::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Broad failure category, for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    WeightBudgetExceeded,
    NotFound,
    Store,
}

/// Service-level error.
///
/// Validation and budget errors are raised before any write. Every other
/// error raised inside a transaction leaves the store as it was.
#[derive(Debug)]
pub enum TrackerError {
    /// Missing or out-of-range input field.
    Validation(ValidationError),
    /// The requested weight does not fit in the goal's remaining budget.
    WeightBudgetExceeded {
        goal_id: GoalId,
        requested: f64,
        available: f64,
    },
    GoalNotFound(GoalId),
    /// Activity does not exist, or does not belong to the addressed goal.
    ActivityNotFound(ActivityId),
    /// The store failed or the transaction aborted.
    Store(RepoError),
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::WeightBudgetExceeded { .. } => ErrorKind::WeightBudgetExceeded,
            Self::GoalNotFound(_) | Self::ActivityNotFound(_) => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::WeightBudgetExceeded { .. } => "weight_budget_exceeded",
            Self::GoalNotFound(_) => "goal_not_found",
            Self::ActivityNotFound(_) => "activity_not_found",
            Self::Store(_) => "store_failed",
        }
    }
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::WeightBudgetExceeded {
                goal_id,
                requested,
                available,
            } => write!(
                f,
                "total weight cannot exceed 100%: goal {goal_id} has {available} left, requested {requested}"
            ),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::ActivityNotFound(id) => write!(f, "activity not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for TrackerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TrackerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::GoalNotFound(id) => Self::GoalNotFound(id),
            RepoError::ActivityNotFound(id) => Self::ActivityNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, TrackerError};
    use crate::db::DbError;
    use crate::repo::store::RepoError;

    #[test]
    fn repo_not_found_maps_to_not_found_kind() {
        let err = TrackerError::from(RepoError::ActivityNotFound(4));
        assert!(matches!(err, TrackerError::ActivityNotFound(4)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn sqlite_failure_maps_to_store_kind() {
        let err = TrackerError::from(RepoError::Db(DbError::Sqlite(
            rusqlite::Error::QueryReturnedNoRows,
        )));
        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(err.code(), "store_failed");
    }
}
