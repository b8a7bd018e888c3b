//! Goal/activity mutation coordinator.
//!
//! # Responsibility
//! - Run "validate, check weight budget, write, recompute goal progress" in
//!   a single store transaction per call.
//! - Evaluate completion/deadline events once the transaction has committed.
//!
//! # Invariants
//! - Callers always name the target goal; no call relies on a "current goal".
//! - A rejected or failed call leaves both collections untouched.
//! - After any activity change commits, the owning goal's stored progress
//!   equals `compute_goal_progress` over its activities.

use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::model::activity::{Activity, ActivityDraft, ActivityFields, ActivityId};
use crate::model::goal::{Goal, GoalDraft, GoalId};
use crate::model::validation::check_weight;
use crate::repo::goal_repo::GoalListQuery;
use crate::repo::store::TrackerStore;
use crate::service::error::{ErrorKind, TrackerError};
use crate::service::notify::{deliver_quietly, LogNotificationSink, NotificationSink};
use crate::service::progress::compute_goal_progress;
use crate::service::reminder::evaluate_goal;
use crate::service::weight_ledger::{self, check_budget};
use crate::view::{activity_view, goal_view, ActivityView, GoalView};
use log::{error, info, warn};
use std::time::Instant;

/// A goal together with its activities, read in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDetail {
    pub goal: Goal,
    pub activities: Vec<Activity>,
}

struct ProgressChange {
    previous: u8,
    goal: Goal,
}

/// Coordinates goal and activity mutations over a [`TrackerStore`].
pub struct GoalService<R: TrackerStore> {
    repo: R,
    config: TrackerConfig,
    clock: Box<dyn Clock>,
    sink: Box<dyn NotificationSink>,
}

impl<R: TrackerStore> GoalService<R> {
    /// Creates a service using wall-clock time and log-only notifications.
    pub fn new(repo: R, config: TrackerConfig) -> Self {
        Self {
            repo,
            config,
            clock: Box::new(SystemClock),
            sink: Box::new(LogNotificationSink),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_notification_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    /// Creates a goal with progress 0.
    pub fn add_goal(&self, draft: GoalDraft) -> Result<Goal, TrackerError> {
        let started_at = Instant::now();
        let result = draft
            .normalized()
            .map_err(TrackerError::from)
            .and_then(|draft| {
                let created_at = self.clock.now();
                self.repo
                    .with_transaction(|repo| -> Result<Goal, TrackerError> {
                        let id = repo.create_goal(&draft, created_at)?;
                        repo.get_goal(id)?.ok_or(TrackerError::GoalNotFound(id))
                    })
            });
        let goal_id = result.as_ref().ok().map(|goal| goal.id);
        self.finish("goal_add", goal_id, started_at, result)
    }

    /// Replaces title, description and deadline.
    ///
    /// `id`, `created_at` and `progress` are carried over unchanged.
    pub fn update_goal(&self, goal_id: GoalId, draft: GoalDraft) -> Result<Goal, TrackerError> {
        let started_at = Instant::now();
        let result = draft
            .normalized()
            .map_err(TrackerError::from)
            .and_then(|draft| {
                self.repo
                    .with_transaction(|repo| -> Result<Goal, TrackerError> {
                        let current = require_goal(repo, goal_id)?;
                        let updated = current.with_fields(draft);
                        repo.replace_goal(&updated)?;
                        Ok(updated)
                    })
            });
        self.finish("goal_update", Some(goal_id), started_at, result)
    }

    /// Deletes a goal and every activity it owns in one transaction.
    ///
    /// Returns how many activities were removed.
    pub fn delete_goal(&self, goal_id: GoalId) -> Result<usize, TrackerError> {
        let started_at = Instant::now();
        let result = self
            .repo
            .with_transaction(|repo| -> Result<usize, TrackerError> {
                require_goal(repo, goal_id)?;
                let removed = repo.delete_activities_for_goal(goal_id)?;
                repo.delete_goal(goal_id)?;
                Ok(removed)
            });
        self.finish("goal_delete", Some(goal_id), started_at, result)
    }

    /// Adds an activity to `goal_id` and recomputes the goal's progress.
    ///
    /// # Errors
    /// - `Validation` for bad input, before the store is touched.
    /// - `WeightBudgetExceeded` when the weight does not fit.
    /// - `GoalNotFound` when the goal does not exist.
    pub fn add_activity(
        &self,
        goal_id: GoalId,
        draft: ActivityDraft,
    ) -> Result<ActivityId, TrackerError> {
        let started_at = Instant::now();
        let result = self.validate_activity(&draft).and_then(|fields| {
            self.repo
                .with_transaction(|repo| -> Result<_, TrackerError> {
                    let goal = require_goal(repo, goal_id)?;
                    if let Some(weight) = fields.weight {
                        let siblings = repo.list_activities_for_goal(goal_id)?;
                        ensure_weight_fits(goal_id, &siblings, weight, None)?;
                    }
                    let activity_id = repo.create_activity(goal_id, &fields)?;
                    let change = self.refresh_progress(repo, goal)?;
                    Ok((activity_id, change))
                })
        });
        let result = result.map(|(activity_id, change)| {
            self.announce(&change);
            activity_id
        });
        self.finish("activity_add", Some(goal_id), started_at, result)
    }

    /// Replaces an activity's title, progress and weight.
    ///
    /// The budget check leaves out the activity's own current weight.
    /// Returns the goal with its recomputed progress.
    pub fn update_activity(
        &self,
        goal_id: GoalId,
        activity_id: ActivityId,
        draft: ActivityDraft,
    ) -> Result<Goal, TrackerError> {
        let started_at = Instant::now();
        let result = self.validate_activity(&draft).and_then(|fields| {
            self.repo
                .with_transaction(|repo| -> Result<ProgressChange, TrackerError> {
                    let goal = require_goal(repo, goal_id)?;
                    let current = require_activity(repo, goal_id, activity_id)?;
                    if let Some(weight) = fields.weight {
                        let siblings = repo.list_activities_for_goal(goal_id)?;
                        ensure_weight_fits(goal_id, &siblings, weight, Some(current.id))?;
                    }
                    let updated = Activity::from_fields(current.id, goal_id, fields);
                    repo.replace_activity(&updated)?;
                    self.refresh_progress(repo, goal)
                })
        });
        let result = result.map(|change| {
            self.announce(&change);
            change.goal
        });
        self.finish("activity_update", Some(goal_id), started_at, result)
    }

    /// Deletes an activity and recomputes the goal's progress.
    pub fn delete_activity(
        &self,
        goal_id: GoalId,
        activity_id: ActivityId,
    ) -> Result<Goal, TrackerError> {
        let started_at = Instant::now();
        let result = self
            .repo
            .with_transaction(|repo| -> Result<ProgressChange, TrackerError> {
                let goal = require_goal(repo, goal_id)?;
                require_activity(repo, goal_id, activity_id)?;
                repo.delete_activity(activity_id)?;
                self.refresh_progress(repo, goal)
            })
            .map(|change| {
                self.announce(&change);
                change.goal
            });
        self.finish("activity_delete", Some(goal_id), started_at, result)
    }

    /// Recomputes and stores a goal's progress from its current activities.
    ///
    /// Calling this twice without an intervening change yields the same goal
    /// and raises no second completion event.
    pub fn recompute_progress(&self, goal_id: GoalId) -> Result<Goal, TrackerError> {
        let started_at = Instant::now();
        let result = self
            .repo
            .with_transaction(|repo| -> Result<ProgressChange, TrackerError> {
                let goal = require_goal(repo, goal_id)?;
                self.refresh_progress(repo, goal)
            })
            .map(|change| {
                self.announce(&change);
                change.goal
            });
        self.finish("progress_recompute", Some(goal_id), started_at, result)
    }

    /// Weight still available for new activities of `goal_id`.
    pub fn remaining_weight(&self, goal_id: GoalId) -> Result<f64, TrackerError> {
        let activities = self.list_activities(goal_id)?;
        Ok(weight_ledger::remaining_weight(&activities))
    }

    /// Whether `candidate` fits the budget of `goal_id`.
    ///
    /// `exclude` names an activity being re-weighted, whose own weight is
    /// left out of the total.
    pub fn would_fit(
        &self,
        goal_id: GoalId,
        candidate: f64,
        exclude: Option<ActivityId>,
    ) -> Result<bool, TrackerError> {
        let candidate = check_weight(candidate)?;
        let activities = self.list_activities(goal_id)?;
        Ok(weight_ledger::would_fit(&activities, candidate, exclude))
    }

    pub fn get_goal(&self, goal_id: GoalId) -> Result<Option<Goal>, TrackerError> {
        self.repo.get_goal(goal_id).map_err(Into::into)
    }

    pub fn list_goals(&self, query: &GoalListQuery) -> Result<Vec<Goal>, TrackerError> {
        self.repo.list_goals(query).map_err(Into::into)
    }

    pub fn find_goals_by_title(&self, title: &str) -> Result<Vec<Goal>, TrackerError> {
        self.repo.find_goals_by_title(title).map_err(Into::into)
    }

    /// Lists a goal's activities in creation order.
    pub fn list_activities(&self, goal_id: GoalId) -> Result<Vec<Activity>, TrackerError> {
        self.goal_detail(goal_id).map(|detail| detail.activities)
    }

    pub fn goal_detail(&self, goal_id: GoalId) -> Result<GoalDetail, TrackerError> {
        self.repo
            .with_read_transaction(|repo| -> Result<GoalDetail, TrackerError> {
                let goal = require_goal(repo, goal_id)?;
                let activities = repo.list_activities_for_goal(goal_id)?;
                Ok(GoalDetail { goal, activities })
            })
    }

    pub fn activity_count(&self, goal_id: GoalId) -> Result<u64, TrackerError> {
        self.repo
            .with_read_transaction(|repo| -> Result<u64, TrackerError> {
                require_goal(repo, goal_id)?;
                Ok(repo.count_activities_for_goal(goal_id)?)
            })
    }

    /// Goal rows for display, each with its activity count.
    pub fn goal_views(&self, query: &GoalListQuery) -> Result<Vec<GoalView>, TrackerError> {
        self.repo
            .with_read_transaction(|repo| -> Result<Vec<GoalView>, TrackerError> {
                let goals = repo.list_goals(query)?;
                let mut views = Vec::with_capacity(goals.len());
                for goal in &goals {
                    let count = repo.count_activities_for_goal(goal.id)?;
                    views.push(goal_view(goal, count));
                }
                Ok(views)
            })
    }

    /// Activity rows for display.
    pub fn activity_views(&self, goal_id: GoalId) -> Result<Vec<ActivityView>, TrackerError> {
        let activities = self.list_activities(goal_id)?;
        Ok(activities.iter().map(activity_view).collect())
    }

    fn validate_activity(&self, draft: &ActivityDraft) -> Result<ActivityFields, TrackerError> {
        draft.validate(self.config.policy).map_err(Into::into)
    }

    fn refresh_progress(&self, repo: &R, goal: Goal) -> Result<ProgressChange, TrackerError> {
        let activities = repo.list_activities_for_goal(goal.id)?;
        let progress = compute_goal_progress(&activities, self.config.policy);
        let previous = goal.progress;
        if progress == previous {
            return Ok(ProgressChange { previous, goal });
        }

        let updated = Goal { progress, ..goal };
        repo.replace_goal(&updated)?;
        Ok(ProgressChange {
            previous,
            goal: updated,
        })
    }

    fn announce(&self, change: &ProgressChange) {
        let event = evaluate_goal(
            &change.goal,
            Some(change.previous),
            self.clock.today(),
            self.config.reminder_window_days,
        );
        if let Some(event) = event {
            deliver_quietly(self.sink.as_ref(), &event);
        }
    }

    fn finish<T>(
        &self,
        op: &'static str,
        goal_id: Option<GoalId>,
        started_at: Instant,
        result: Result<T, TrackerError>,
    ) -> Result<T, TrackerError> {
        let goal_id = goal_id.map_or_else(|| "none".to_string(), |id| id.to_string());
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => info!(
                "event={op} module=service status=ok goal_id={goal_id} policy={} duration_ms={duration_ms}",
                self.config.policy.as_str()
            ),
            Err(err) if err.kind() == ErrorKind::Store => error!(
                "event={op} module=service status=error goal_id={goal_id} duration_ms={duration_ms} error_code={} error={err}",
                err.code()
            ),
            Err(err) => warn!(
                "event={op} module=service status=rejected goal_id={goal_id} duration_ms={duration_ms} error_code={}",
                err.code()
            ),
        }
        result
    }
}

fn require_goal<R: TrackerStore>(repo: &R, goal_id: GoalId) -> Result<Goal, TrackerError> {
    repo.get_goal(goal_id)?
        .ok_or(TrackerError::GoalNotFound(goal_id))
}

fn require_activity<R: TrackerStore>(
    repo: &R,
    goal_id: GoalId,
    activity_id: ActivityId,
) -> Result<Activity, TrackerError> {
    repo.get_activity(activity_id)?
        .filter(|activity| activity.goal_id == goal_id)
        .ok_or(TrackerError::ActivityNotFound(activity_id))
}

fn ensure_weight_fits(
    goal_id: GoalId,
    siblings: &[Activity],
    weight: f64,
    exclude: Option<ActivityId>,
) -> Result<(), TrackerError> {
    check_budget(siblings, weight, exclude).map_err(|exceeded| {
        TrackerError::WeightBudgetExceeded {
            goal_id,
            requested: exceeded.requested,
            available: exceeded.available,
        }
    })
}
