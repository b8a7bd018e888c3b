//! Goal progress aggregation.
//!
//! Output is a pure function of the activity set: no clock, and input order
//! only affects float summation below the rounding tolerance.

use crate::config::ProgressPolicy;
use crate::model::activity::Activity;

// Keeps an exact .5 that float division lands just under still rounding up.
const ROUNDING_EPSILON: f64 = 1e-9;

/// Computes a goal's progress percentage from its activities.
///
/// - `Average`: mean activity progress, rounded half up; ignores weights.
/// - `Weighted`: `sum(progress * weight) / sum(weight)` over weighted
///   activities, rounded half up. Unweighted activities contribute nothing.
///
/// Returns 0 for an empty set or a zero total weight.
pub fn compute_goal_progress(activities: &[Activity], policy: ProgressPolicy) -> u8 {
    match policy {
        ProgressPolicy::Average => average_progress(activities),
        ProgressPolicy::Weighted => weighted_average_progress(activities),
    }
}

fn average_progress(activities: &[Activity]) -> u8 {
    if activities.is_empty() {
        return 0;
    }
    let total: u64 = activities
        .iter()
        .map(|activity| u64::from(activity.progress))
        .sum();
    let count = activities.len() as u64;
    // floor(total / count + 1/2) in integers.
    let rounded = (2 * total + count) / (2 * count);
    clamp_percent(rounded as f64)
}

fn weighted_average_progress(activities: &[Activity]) -> u8 {
    let (weighted_sum, weight_sum) = activities
        .iter()
        .filter_map(|activity| activity.weight.map(|weight| (activity.progress, weight)))
        .fold((0.0_f64, 0.0_f64), |(sum, weights), (progress, weight)| {
            (sum + f64::from(progress) * weight, weights + weight)
        });

    if weight_sum <= 0.0 {
        return 0;
    }
    clamp_percent((weighted_sum / weight_sum + 0.5 + ROUNDING_EPSILON).floor())
}

fn clamp_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0) as u8
}
