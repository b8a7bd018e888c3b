//! Core domain logic for goal tracking.
//! Goals own weighted activities; goal progress is always derived here.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{LoggingConfig, ProgressPolicy, TrackerConfig, DEFAULT_REMINDER_WINDOW_DAYS};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::activity::{Activity, ActivityDraft, ActivityFields, ActivityId};
pub use model::event::GoalEvent;
pub use model::goal::{Goal, GoalDraft, GoalId};
pub use model::validation::ValidationError;
pub use repo::activity_repo::ActivityRepository;
pub use repo::goal_repo::{GoalListQuery, GoalOrder, GoalRepository};
pub use repo::store::{
    RepoError, RepoResult, SqliteTrackerStore, TrackerStore, TransactionalStore,
};
pub use service::error::{ErrorKind, TrackerError};
pub use service::goal_service::{GoalDetail, GoalService};
pub use service::notify::{LogNotificationSink, NoopNotificationSink, NotificationSink};
pub use service::progress::compute_goal_progress;
pub use service::reminder::evaluate_goal;
pub use view::{ActivityView, GoalView, ProgressBand, TitleSegment};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
