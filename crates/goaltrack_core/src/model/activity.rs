//! Activity record and user-editable activity fields.
//!
//! # Invariants
//! - `weighted_progress == progress * weight / 100` whenever `weight` is set,
//!   and is `None` otherwise.
//! - `goal_id` never changes; moving an activity between goals is not a
//!   supported edit.

use crate::config::ProgressPolicy;
use crate::model::goal::GoalId;
use crate::model::validation::{check_progress, check_weight, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned activity identifier.
pub type ActivityId = i64;

const WEIGHTED_PROGRESS_TOLERANCE: f64 = 1e-6;

/// Canonical persisted activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub goal_id: GoalId,
    pub title: String,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_progress: Option<f64>,
}

impl Activity {
    /// Builds a record from validated fields, deriving `weighted_progress`.
    pub fn from_fields(id: ActivityId, goal_id: GoalId, fields: ActivityFields) -> Self {
        let weighted_progress = fields.weighted_progress();
        Self {
            id,
            goal_id,
            title: fields.title,
            progress: fields.progress,
            weight: fields.weight,
            weighted_progress,
        }
    }

    /// Checks persisted fields still satisfy activity invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        check_progress(i64::from(self.progress))?;
        if let Some(weight) = self.weight {
            check_weight(weight)?;
        }

        let expected = self
            .weight
            .map(|weight| weighted_progress(self.progress, weight));
        let consistent = match (expected, self.weighted_progress) {
            (None, None) => true,
            (Some(expected), Some(actual)) => {
                (expected - actual).abs() <= WEIGHTED_PROGRESS_TOLERANCE
            }
            _ => false,
        };
        if !consistent {
            return Err(ValidationError::StaleDerivedField("weighted_progress"));
        }
        Ok(())
    }
}

/// An activity's contribution to its goal: `progress * weight / 100`.
pub fn weighted_progress(progress: u8, weight: f64) -> f64 {
    f64::from(progress) * weight / 100.0
}

/// Raw activity input as typed by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDraft {
    pub title: String,
    pub progress: i64,
    pub weight: Option<f64>,
}

impl ActivityDraft {
    pub fn new(title: impl Into<String>, progress: i64) -> Self {
        Self {
            title: title.into(),
            progress,
            weight: None,
        }
    }

    pub fn weighted(title: impl Into<String>, progress: i64, weight: f64) -> Self {
        Self {
            title: title.into(),
            progress,
            weight: Some(weight),
        }
    }

    /// Validates the draft for the active progress policy.
    ///
    /// # Errors
    /// - Blank title, progress outside `0..=100`, weight outside `(0, 100]`.
    /// - `WeightRequired` when `policy` is weighted and no weight is given.
    pub fn validate(&self, policy: ProgressPolicy) -> Result<ActivityFields, ValidationError> {
        let title = require_text("title", &self.title)?;
        let progress = check_progress(self.progress)?;
        let weight = match self.weight {
            Some(weight) => Some(check_weight(weight)?),
            None if policy.requires_weight() => return Err(ValidationError::WeightRequired),
            None => None,
        };
        Ok(ActivityFields {
            title,
            progress,
            weight,
        })
    }
}

/// Validated activity input.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityFields {
    pub title: String,
    pub progress: u8,
    pub weight: Option<f64>,
}

impl ActivityFields {
    pub fn weighted_progress(&self) -> Option<f64> {
        self.weight
            .map(|weight| weighted_progress(self.progress, weight))
    }
}

#[cfg(test)]
mod tests {
    use super::{Activity, ActivityDraft};
    use crate::config::ProgressPolicy;
    use crate::model::validation::ValidationError;

    #[test]
    fn weighted_policy_requires_weight() {
        let draft = ActivityDraft::new("Read chapter", 40);
        assert_eq!(
            draft.validate(ProgressPolicy::Weighted),
            Err(ValidationError::WeightRequired)
        );
        let fields = draft.validate(ProgressPolicy::Average).unwrap();
        assert_eq!(fields.weight, None);
        assert_eq!(fields.weighted_progress(), None);
    }

    #[test]
    fn from_fields_derives_weighted_progress() {
        let fields = ActivityDraft::weighted("Intervals", 50, 20.0)
            .validate(ProgressPolicy::Weighted)
            .unwrap();
        let activity = Activity::from_fields(3, 1, fields);
        assert_eq!(activity.weighted_progress, Some(10.0));
        assert!(activity.validate().is_ok());
    }

    #[test]
    fn stale_weighted_progress_fails_validation() {
        let fields = ActivityDraft::weighted("Intervals", 50, 20.0)
            .validate(ProgressPolicy::Weighted)
            .unwrap();
        let mut activity = Activity::from_fields(3, 1, fields);
        activity.progress = 100;
        assert_eq!(
            activity.validate(),
            Err(ValidationError::StaleDerivedField("weighted_progress"))
        );
    }
}
