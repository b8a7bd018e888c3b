//! Per-goal weight budget accounting.
//!
//! # Invariants
//! - The weights of one goal's activities sum to at most [`WEIGHT_BUDGET`].
//! - When an existing activity is re-weighted, its own current weight is left
//!   out of the committed total.

use crate::model::activity::{Activity, ActivityId};

/// Total weight one goal can hand out.
pub const WEIGHT_BUDGET: f64 = 100.0;

// Absorbs binary rounding so 33.33 + 33.33 + 33.34 still fits.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Budget check failure details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetExceeded {
    pub requested: f64,
    pub available: f64,
}

/// Sum of weights already committed, optionally skipping one activity.
pub fn committed_weight(activities: &[Activity], exclude: Option<ActivityId>) -> f64 {
    activities
        .iter()
        .filter(|activity| Some(activity.id) != exclude)
        .filter_map(|activity| activity.weight)
        .sum()
}

/// Weight still available to new activities, in `0..=100`.
pub fn remaining_weight(activities: &[Activity]) -> f64 {
    available_weight(activities, None)
}

/// Whether `candidate` fits next to the other activities' weights.
pub fn would_fit(activities: &[Activity], candidate: f64, exclude: Option<ActivityId>) -> bool {
    candidate + committed_weight(activities, exclude) <= WEIGHT_BUDGET + WEIGHT_EPSILON
}

/// Like [`would_fit`], reporting what was available on failure.
pub fn check_budget(
    activities: &[Activity],
    candidate: f64,
    exclude: Option<ActivityId>,
) -> Result<(), BudgetExceeded> {
    if would_fit(activities, candidate, exclude) {
        return Ok(());
    }
    Err(BudgetExceeded {
        requested: candidate,
        available: available_weight(activities, exclude),
    })
}

fn available_weight(activities: &[Activity], exclude: Option<ActivityId>) -> f64 {
    let remaining = WEIGHT_BUDGET - committed_weight(activities, exclude);
    if remaining < WEIGHT_EPSILON {
        0.0
    } else {
        remaining.min(WEIGHT_BUDGET)
    }
}
