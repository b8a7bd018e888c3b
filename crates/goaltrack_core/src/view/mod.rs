//! Display-facing projections of goals and activities.
//!
//! These types carry nothing a caller could write back; they exist so a UI
//! layer receives ready-to-render rows without reaching into the store.

pub mod links;

use crate::model::activity::{Activity, ActivityId};
use crate::model::goal::{Goal, GoalId};
use chrono::NaiveDate;
use serde::Serialize;

pub use links::{split_title_links, TitleSegment};

/// Coarse progress bucket used to colour progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressBand {
    Low,
    Medium,
    High,
}

impl ProgressBand {
    pub fn from_progress(progress: u8) -> Self {
        match progress {
            80.. => Self::High,
            50..=79 => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    pub id: GoalId,
    pub title: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub progress: u8,
    pub band: ProgressBand,
    pub activity_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub id: ActivityId,
    pub title: String,
    pub title_segments: Vec<TitleSegment>,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_progress: Option<f64>,
}

pub fn goal_view(goal: &Goal, activity_count: u64) -> GoalView {
    GoalView {
        id: goal.id,
        title: goal.title.clone(),
        description: goal.description.clone(),
        deadline: goal.deadline,
        progress: goal.progress,
        band: ProgressBand::from_progress(goal.progress),
        activity_count,
    }
}

pub fn activity_view(activity: &Activity) -> ActivityView {
    ActivityView {
        id: activity.id,
        title: activity.title.clone(),
        title_segments: split_title_links(&activity.title),
        progress: activity.progress,
        weight: activity.weight,
        weighted_progress: activity.weighted_progress,
    }
}
