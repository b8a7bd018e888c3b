//! Completion and deadline evaluation after a progress recompute.

use crate::model::event::GoalEvent;
use crate::model::goal::Goal;
use chrono::NaiveDate;

/// Decides which event, if any, a freshly recomputed goal should raise.
///
/// - `GoalCompleted` when progress reached 100 and `previous_progress` was
///   below 100. `None` for `previous_progress` counts as below 100.
/// - Otherwise, for an incomplete goal, `DeadlineApproaching` when the
///   deadline is `1..=window_days` days after `today`.
/// - A goal that stays at 100 raises nothing.
pub fn evaluate_goal(
    goal: &Goal,
    previous_progress: Option<u8>,
    today: NaiveDate,
    window_days: i64,
) -> Option<GoalEvent> {
    if goal.is_complete() {
        let was_complete = previous_progress.is_some_and(|previous| previous >= 100);
        if was_complete {
            return None;
        }
        return Some(GoalEvent::GoalCompleted {
            goal_id: goal.id,
            goal_title: goal.title.clone(),
        });
    }

    let days_left = goal.days_until_deadline(today);
    if days_left > 0 && days_left <= window_days {
        return Some(GoalEvent::DeadlineApproaching {
            goal_id: goal.id,
            goal_title: goal.title.clone(),
            days_left,
        });
    }
    None
}
