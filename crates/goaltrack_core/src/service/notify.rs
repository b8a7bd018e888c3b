//! Delivery of goal events to whatever notifies the user.
//!
//! # Invariants
//! - Delivery failure never fails or rolls back the operation that raised
//!   the event; it is logged and dropped.

use crate::model::event::GoalEvent;
use log::{info, warn};

/// Receives goal events after the triggering change has committed.
pub trait NotificationSink {
    /// Delivers one event. An `Err` is logged by the caller and ignored.
    fn deliver(&self, event: &GoalEvent) -> Result<(), String>;
}

/// Writes events to the log. Default sink when no platform notifier exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn deliver(&self, event: &GoalEvent) -> Result<(), String> {
        info!(
            "event=goal_notification module=notify status=ok kind={} goal_id={}",
            event.kind(),
            event.goal_id()
        );
        Ok(())
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSink;

impl NotificationSink for NoopNotificationSink {
    fn deliver(&self, _event: &GoalEvent) -> Result<(), String> {
        Ok(())
    }
}

pub(crate) fn deliver_quietly(sink: &dyn NotificationSink, event: &GoalEvent) {
    if let Err(err) = sink.deliver(event) {
        warn!(
            "event=goal_notification module=notify status=error kind={} goal_id={} error_code=delivery_failed error={}",
            event.kind(),
            event.goal_id(),
            err
        );
    }
}
