//! Goal tracking use-cases.
//!
//! # Responsibility
//! - Validate input, enforce the weight budget, persist, recompute derived
//!   progress and raise events, as one unit per call.
//! - Keep callers (UI/FFI) away from storage details.
//!
//! # Invariants
//! - The service is the only writer of `Goal::progress` and
//!   `Activity::weighted_progress`.

pub mod error;
pub mod goal_service;
pub mod notify;
pub mod progress;
pub mod reminder;
pub mod weight_ledger;
