//! Goal record and user-editable goal fields.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `progress` is only written by progress recomputation.

use crate::model::validation::{require_text, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned goal identifier.
pub type GoalId = i64;

/// Calendar date format accepted for deadlines.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Canonical persisted goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    pub description: String,
    pub deadline: NaiveDate,
    /// Derived completion percentage in `0..=100`.
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Checks persisted fields still satisfy goal invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        if self.progress > 100 {
            return Err(ValidationError::ProgressOutOfRange(i64::from(self.progress)));
        }
        Ok(())
    }

    /// Returns whether the goal has reached 100%.
    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    /// Whole days from `today` until the deadline; negative once passed.
    pub fn days_until_deadline(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    /// Applies edited fields while keeping identity and derived progress.
    pub fn with_fields(&self, fields: GoalDraft) -> Self {
        Self {
            id: self.id,
            title: fields.title,
            description: fields.description,
            deadline: fields.deadline,
            progress: self.progress,
            created_at: self.created_at,
        }
    }
}

/// User-supplied goal fields for create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    pub title: String,
    pub description: String,
    pub deadline: NaiveDate,
}

impl GoalDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            deadline,
        }
    }

    /// Builds a draft from raw form text, parsing the deadline.
    pub fn parse(title: &str, description: &str, deadline: &str) -> Result<Self, ValidationError> {
        let deadline = parse_deadline(deadline)?;
        Ok(Self::new(title, description, deadline))
    }

    /// Returns a trimmed copy, or the first invalid field.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: require_text("title", &self.title)?,
            description: require_text("description", &self.description)?,
            deadline: self.deadline,
        })
    }
}

/// Parses a `YYYY-MM-DD` deadline.
///
/// A trailing time part (`2025-03-01T00:00:00Z`) is ignored, matching how
/// stored deadlines were edited back into date inputs.
pub fn parse_deadline(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("deadline"));
    }
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DEADLINE_FORMAT)
        .map_err(|_| ValidationError::InvalidDeadline(trimmed.to_string()))
}
