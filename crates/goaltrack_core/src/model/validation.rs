//! Field-level validation shared by goal and activity inputs.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Highest allowed progress percentage.
pub const PROGRESS_MAX: i64 = 100;
/// Highest allowed single activity weight, and the per-goal weight budget.
pub const WEIGHT_MAX: f64 = 100.0;

/// Rejected input field.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required text field is blank after trim.
    EmptyField(&'static str),
    /// Deadline text is not a `YYYY-MM-DD` calendar date.
    InvalidDeadline(String),
    /// Progress is outside `0..=100`.
    ProgressOutOfRange(i64),
    /// Weight is not in `(0, 100]` or not finite.
    WeightOutOfRange(f64),
    /// The weighted policy is active and no weight was supplied.
    WeightRequired,
    /// A derived field disagrees with the fields it is derived from.
    StaleDerivedField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidDeadline(value) => {
                write!(f, "deadline must be a YYYY-MM-DD date, got `{value}`")
            }
            Self::ProgressOutOfRange(value) => {
                write!(f, "progress must be between 0 and 100, got {value}")
            }
            Self::WeightOutOfRange(value) => {
                write!(f, "weight must be greater than 0 and at most 100, got {value}")
            }
            Self::WeightRequired => write!(f, "weight is required for weighted goals"),
            Self::StaleDerivedField(field) => {
                write!(f, "{field} does not match the values it is derived from")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing is left.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Checks a user-supplied progress value and narrows it to a percentage.
pub fn check_progress(value: i64) -> Result<u8, ValidationError> {
    if !(0..=PROGRESS_MAX).contains(&value) {
        return Err(ValidationError::ProgressOutOfRange(value));
    }
    u8::try_from(value).map_err(|_| ValidationError::ProgressOutOfRange(value))
}

/// Checks a weight lies in `(0, 100]`.
pub fn check_weight(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value <= 0.0 || value > WEIGHT_MAX {
        return Err(ValidationError::WeightOutOfRange(value));
    }
    Ok(value)
}
