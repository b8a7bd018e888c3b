//! Goal persistence over the `goals` table.
//!
//! # Invariants
//! - `create_goal` always stores `progress = 0`.
//! - `replace_goal` never changes `id` or `created_at`.

use crate::model::goal::{Goal, GoalDraft, GoalId};
use crate::repo::store::{RepoError, RepoResult, SqliteTrackerStore};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, Value};
use rusqlite::{params, params_from_iter, Row};

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    deadline,
    progress,
    created_at
FROM goals";

/// Sort order for goal listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GoalOrder {
    /// Creation order.
    #[default]
    Id,
    /// Nearest deadline first, ties by id.
    Deadline,
}

/// Query options for listing goals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalListQuery {
    pub order: GoalOrder,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for goal records.
pub trait GoalRepository {
    fn create_goal(&self, draft: &GoalDraft, created_at: DateTime<Utc>) -> RepoResult<GoalId>;
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>>;
    fn list_goals(&self, query: &GoalListQuery) -> RepoResult<Vec<Goal>>;
    /// Exact-title lookup through the title index.
    fn find_goals_by_title(&self, title: &str) -> RepoResult<Vec<Goal>>;
    /// Full replace by id.
    fn replace_goal(&self, goal: &Goal) -> RepoResult<()>;
    /// Deletes the goal row only; activities must already be gone.
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;
}

impl GoalRepository for SqliteTrackerStore<'_> {
    fn create_goal(&self, draft: &GoalDraft, created_at: DateTime<Utc>) -> RepoResult<GoalId> {
        let draft = draft.normalized()?;
        self.conn.execute(
            "INSERT INTO goals (title, description, deadline, progress, created_at)
             VALUES (?1, ?2, ?3, 0, ?4);",
            params![
                draft.title.as_str(),
                draft.description.as_str(),
                draft.deadline,
                created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }
        Ok(None)
    }

    fn list_goals(&self, query: &GoalListQuery) -> RepoResult<Vec<Goal>> {
        let mut sql = String::from(GOAL_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        match query.order {
            GoalOrder::Id => sql.push_str(" ORDER BY id ASC"),
            GoalOrder::Deadline => sql.push_str(" ORDER BY deadline ASC, id ASC"),
        }

        match (query.limit, query.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
                bind_values.push(Value::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn find_goals_by_title(&self, title: &str) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL} WHERE title = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([title.trim()])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn replace_goal(&self, goal: &Goal) -> RepoResult<()> {
        goal.validate()?;

        let changed = self.conn.execute(
            "UPDATE goals
             SET
                title = ?2,
                description = ?3,
                deadline = ?4,
                progress = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                goal.id,
                goal.title.as_str(),
                goal.description.as_str(),
                goal.deadline,
                goal.progress,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::GoalNotFound(goal.id));
        }
        Ok(())
    }

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM goals WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::GoalNotFound(id));
        }
        Ok(())
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let id: GoalId = row.get("id")?;
    let progress = match row.get::<_, i64>("progress")? {
        value @ 0..=100 => value as u8,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid progress `{other}` in goals.progress for goal {id}"
            )));
        }
    };

    let goal = Goal {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        deadline: stored_column(row, id, "deadline")?,
        progress,
        created_at: stored_column(row, id, "created_at")?,
    };
    goal.validate()
        .map_err(|err| RepoError::InvalidData(format!("goal {id} failed validation: {err}")))?;
    Ok(goal)
}

/// Reads a typed column; unparseable stored values become `InvalidData`.
fn stored_column<T: FromSql>(row: &Row<'_>, id: GoalId, column: &str) -> RepoResult<T> {
    row.get(column).map_err(|err| match err {
        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
            RepoError::InvalidData(format!("unreadable goals.{column} for goal {id}: {err}"))
        }
        other => RepoError::from(other),
    })
}
