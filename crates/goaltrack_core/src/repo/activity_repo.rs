//! Activity persistence over the `activities` table.
//!
//! # Invariants
//! - Every row references an existing goal (`goal_id` foreign key).
//! - `weighted_progress` is stored exactly as handed in by the caller.

use crate::model::activity::{Activity, ActivityFields, ActivityId};
use crate::model::goal::GoalId;
use crate::repo::store::{RepoError, RepoResult, SqliteTrackerStore};
use rusqlite::{params, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    goal_id,
    title,
    progress,
    weight,
    weighted_progress
FROM activities";

/// Repository interface for activity records.
pub trait ActivityRepository {
    fn create_activity(&self, goal_id: GoalId, fields: &ActivityFields) -> RepoResult<ActivityId>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    /// Lookup through the `goal_id` index, in creation order.
    fn list_activities_for_goal(&self, goal_id: GoalId) -> RepoResult<Vec<Activity>>;
    fn count_activities_for_goal(&self, goal_id: GoalId) -> RepoResult<u64>;
    /// Full replace by id.
    fn replace_activity(&self, activity: &Activity) -> RepoResult<()>;
    fn delete_activity(&self, id: ActivityId) -> RepoResult<()>;
    /// Deletes every activity of `goal_id`, returning how many were removed.
    fn delete_activities_for_goal(&self, goal_id: GoalId) -> RepoResult<usize>;
}

impl ActivityRepository for SqliteTrackerStore<'_> {
    fn create_activity(&self, goal_id: GoalId, fields: &ActivityFields) -> RepoResult<ActivityId> {
        let candidate = Activity::from_fields(0, goal_id, fields.clone());
        candidate.validate()?;

        self.conn.execute(
            "INSERT INTO activities (goal_id, title, progress, weight, weighted_progress)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                goal_id,
                candidate.title.as_str(),
                candidate.progress,
                candidate.weight,
                candidate.weighted_progress,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_activity_row(row)?));
        }
        Ok(None)
    }

    fn list_activities_for_goal(&self, goal_id: GoalId) -> RepoResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL} WHERE goal_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([goal_id])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn count_activities_for_goal(&self, goal_id: GoalId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM activities WHERE goal_id = ?1;",
            [goal_id],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative activity count `{count}`")))
    }

    fn replace_activity(&self, activity: &Activity) -> RepoResult<()> {
        activity.validate()?;

        let changed = self.conn.execute(
            "UPDATE activities
             SET
                title = ?3,
                progress = ?4,
                weight = ?5,
                weighted_progress = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND goal_id = ?2;",
            params![
                activity.id,
                activity.goal_id,
                activity.title.as_str(),
                activity.progress,
                activity.weight,
                activity.weighted_progress,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ActivityNotFound(activity.id));
        }
        Ok(())
    }

    fn delete_activity(&self, id: ActivityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::ActivityNotFound(id));
        }
        Ok(())
    }

    fn delete_activities_for_goal(&self, goal_id: GoalId) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM activities WHERE goal_id = ?1;", [goal_id])?;
        Ok(removed)
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let id: ActivityId = row.get("id")?;
    let progress = match row.get::<_, i64>("progress")? {
        value @ 0..=100 => value as u8,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid progress `{other}` in activities.progress for activity {id}"
            )));
        }
    };

    let activity = Activity {
        id,
        goal_id: row.get("goal_id")?,
        title: row.get("title")?,
        progress,
        weight: row.get("weight")?,
        weighted_progress: row.get("weighted_progress")?,
    };
    activity.validate().map_err(|err| {
        RepoError::InvalidData(format!("activity {id} failed validation: {err}"))
    })?;
    Ok(activity)
}
