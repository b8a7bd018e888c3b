//! Domain model for goals, activities and the events they raise.
//!
//! # Invariants
//! - `Goal::progress` and `Activity::weighted_progress` are derived values;
//!   user input never sets them directly.
//! - Every activity belongs to exactly one goal.

pub mod activity;
pub mod event;
pub mod goal;
pub mod validation;
