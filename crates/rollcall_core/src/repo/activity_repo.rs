//! Activity repository contract and SQLite implementation.

use crate::model::activity::{Activity, ActivityId, ActivityStatus, ActivityType, NewActivity};
use crate::repo::{now_epoch_ms, parse_date, parse_uuid, RepoError, RepoResult, DATE_FORMAT};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    title,
    type,
    description,
    due_date,
    max_score,
    status,
    created_at
FROM activities";

/// Data access for the `activities` collection.
pub trait ActivityRepository {
    fn create_activity(&self, input: &NewActivity) -> RepoResult<Activity>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    /// Newest first; ties ordered by id.
    fn list_activities(&self) -> RepoResult<Vec<Activity>>;
    /// Writes every mutable field of `activity` by id.
    fn update_activity(&self, activity: &Activity) -> RepoResult<()>;
    fn delete_activity(&self, id: ActivityId) -> RepoResult<()>;
}

pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn create_activity(&self, input: &NewActivity) -> RepoResult<Activity> {
        input.validate()?;
        let input = input.normalized();

        let activity = Activity {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            kind: input.kind,
            description: input.description.clone(),
            due_date: input.due_date,
            max_score: input.max_score,
            status: input.initial_status(),
            created_at: now_epoch_ms(),
        };

        self.conn.execute(
            "INSERT INTO activities (
                id,
                title,
                type,
                description,
                due_date,
                max_score,
                status,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                activity.id.to_string(),
                activity.title,
                activity.kind.as_str(),
                activity.description,
                activity
                    .due_date
                    .map(|due| due.format(DATE_FORMAT).to_string()),
                activity.max_score,
                activity.status.as_str(),
                activity.created_at,
            ],
        )?;

        Ok(activity)
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_activity_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_activities(&self) -> RepoResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL} ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn update_activity(&self, activity: &Activity) -> RepoResult<()> {
        activity.validate()?;

        let changed = self.conn.execute(
            "UPDATE activities
             SET
                title = ?1,
                type = ?2,
                description = ?3,
                due_date = ?4,
                max_score = ?5,
                status = ?6
             WHERE id = ?7;",
            params![
                activity.title,
                activity.kind.as_str(),
                activity.description,
                activity
                    .due_date
                    .map(|due| due.format(DATE_FORMAT).to_string()),
                activity.max_score,
                activity.status.as_str(),
                activity.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "activity",
                id: activity.id,
            });
        }
        Ok(())
    }

    fn delete_activity(&self, id: ActivityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "activity",
                id,
            });
        }
        Ok(())
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let id_text: String = row.get("id")?;
    let type_text: String = row.get("type")?;
    let status_text: String = row.get("status")?;

    let kind: ActivityType = type_text.parse().map_err(|_| {
        RepoError::InvalidData(format!("invalid activity type `{type_text}` in activities.type"))
    })?;
    let status: ActivityStatus = status_text.parse().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid activity status `{status_text}` in activities.status"
        ))
    })?;
    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(value) => Some(parse_date("activities.due_date", &value)?),
        None => None,
    };

    let activity = Activity {
        id: parse_uuid("activities.id", &id_text)?,
        title: row.get("title")?,
        kind,
        description: row.get("description")?,
        due_date,
        max_score: row.get("max_score")?,
        status,
        created_at: row.get("created_at")?,
    };
    activity
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("activity {}: {err}", activity.id)))?;
    Ok(activity)
}
