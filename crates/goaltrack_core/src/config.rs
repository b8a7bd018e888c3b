//! Deployment settings for the tracker core.
//!
//! # Invariants
//! - One progress policy is chosen per deployment and applied to every goal;
//!   nothing switches policy per call.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reminder window used when none is configured.
pub const DEFAULT_REMINDER_WINDOW_DAYS: i64 = 3;

/// How activity progress folds into goal progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPolicy {
    /// Plain mean of activity progress; weights, if any, are ignored.
    Average,
    /// Mean of activity progress weighted by each activity's weight.
    #[default]
    Weighted,
}

impl ProgressPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Weighted => "weighted",
        }
    }

    /// Whether every activity must carry a weight under this policy.
    pub fn requires_weight(self) -> bool {
        matches!(self, Self::Weighted)
    }
}

/// Settings for [`crate::GoalService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub policy: ProgressPolicy,
    /// A reminder fires when the deadline is at most this many days away.
    pub reminder_window_days: i64,
}

impl TrackerConfig {
    pub fn new(policy: ProgressPolicy) -> Self {
        Self {
            policy,
            reminder_window_days: DEFAULT_REMINDER_WINDOW_DAYS,
        }
    }

    pub fn with_reminder_window_days(mut self, days: i64) -> Self {
        self.reminder_window_days = days.max(0);
        self
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(ProgressPolicy::default())
    }
}

/// Settings for [`crate::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`, case-insensitive.
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: level.into(),
            log_dir: log_dir.into(),
        }
    }

    /// Uses `debug` in debug builds and `info` in release builds.
    pub fn with_default_level(log_dir: impl Into<PathBuf>) -> Self {
        Self::new(default_log_level(), log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgressPolicy, TrackerConfig, DEFAULT_REMINDER_WINDOW_DAYS};

    #[test]
    fn default_config_is_weighted_with_three_day_window() {
        let config = TrackerConfig::default();
        assert_eq!(config.policy, ProgressPolicy::Weighted);
        assert_eq!(config.reminder_window_days, DEFAULT_REMINDER_WINDOW_DAYS);
    }

    #[test]
    fn negative_window_is_clamped() {
        let config = TrackerConfig::new(ProgressPolicy::Average).with_reminder_window_days(-2);
        assert_eq!(config.reminder_window_days, 0);
    }
}
