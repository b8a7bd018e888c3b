//! Goal events handed to notification delivery.

use crate::model::goal::GoalId;
use serde::{Deserialize, Serialize};

/// Event raised after a goal's progress is recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GoalEvent {
    /// Progress crossed from below 100 to 100.
    #[serde(rename_all = "camelCase")]
    GoalCompleted { goal_id: GoalId, goal_title: String },
    /// Deadline is a few days away and the goal is not complete.
    #[serde(rename_all = "camelCase")]
    DeadlineApproaching {
        goal_id: GoalId,
        goal_title: String,
        days_left: i64,
    },
}

impl GoalEvent {
    pub fn goal_id(&self) -> GoalId {
        match self {
            Self::GoalCompleted { goal_id, .. } | Self::DeadlineApproaching { goal_id, .. } => {
                *goal_id
            }
        }
    }

    /// Stable event name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GoalCompleted { .. } => "goal_completed",
            Self::DeadlineApproaching { .. } => "deadline_approaching",
        }
    }

    /// User-facing notification body.
    pub fn message(&self) -> String {
        match self {
            Self::GoalCompleted { goal_title, .. } => {
                format!("Congratulations! You've completed your goal: {goal_title}")
            }
            Self::DeadlineApproaching {
                goal_title,
                days_left,
                ..
            } => format!("Reminder: {days_left} days left to complete your goal: {goal_title}"),
        }
    }
}
