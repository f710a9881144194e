//! Activity repository

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{ensure_index_code, like_pattern, optional_text, required_text, RepoError, RepoResult, Store};
use crate::core::index::{IndexTable, ACTIVITY_STATUS_CLOSED};
use crate::core::rules;
use crate::entities::{Activity, ActivityFilter, ActivityInput};

const ACTIVITY_SELECT: &str = r#"SELECT a.id, a.type_code, a.subtype_code, a.status_code, a.title,
           a.ticket_code, a.assigned_member_id, a.project_id, a.target_release_id,
           a.start_date, a.end_date, a.created_at, a.updated_at,
           m.name, p.project_code, r.release_code
    FROM activities a
    LEFT JOIN members m ON m.id = a.assigned_member_id
    LEFT JOIN projects p ON p.id = a.project_id
    LEFT JOIN releases r ON r.id = a.target_release_id"#;

fn activity_from_row(row: &Row) -> rusqlite::Result<Activity> {
    let mut activity = Activity {
        id: row.get(0)?,
        type_code: row.get(1)?,
        subtype_code: row.get(2)?,
        status_code: row.get(3)?,
        title: row.get(4)?,
        ticket_code: row.get(5)?,
        assigned_member_id: row.get(6)?,
        project_id: row.get(7)?,
        target_release_id: row.get(8)?,
        start_date: row.get(9)?,
        end_date: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
        type_name: String::new(),
        subtype_name: String::new(),
        status_name: String::new(),
        assigned_member_name: row.get(13)?,
        project_code: row.get(14)?,
        target_release_code: row.get(15)?,
    };
    activity.resolve_names();
    Ok(activity)
}

fn validate_activity(
    conn: &rusqlite::Connection,
    input: &ActivityInput,
    today: NaiveDate,
) -> RepoResult<ActivityInput> {
    let title = required_text(&input.title, "Title is required.")?;
    ensure_index_code(conn, IndexTable::ActivityType, &input.type_code)?;
    ensure_index_code(conn, IndexTable::ActivitySubtype, &input.subtype_code)?;
    ensure_index_code(conn, IndexTable::ActivityStatus, &input.status_code)?;

    if let Some(project_id) = input.project_id {
        Store::ensure_open_project(conn, project_id)?;
    }
    if let Some(release_id) = input.target_release_id {
        Store::ensure_targetable_release(conn, release_id, today)?;
    }
    if let Some(member_id) = input.assigned_member_id {
        let exists = conn
            .query_row("SELECT 1 FROM members WHERE id = ?1", params![member_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(RepoError::invalid(format!(
                "Assigned member {} does not exist.",
                member_id
            )));
        }
    }

    Ok(ActivityInput {
        title,
        ticket_code: optional_text(input.ticket_code.as_deref()),
        ..input.clone()
    })
}

impl Store {
    /// List activities, newest first
    pub fn list_activities(&self, filter: &ActivityFilter) -> RepoResult<Vec<Activity>> {
        let mut sql = format!("{} WHERE 1=1", ACTIVITY_SELECT);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(ref status) = filter.status_code {
            sql.push_str(" AND a.status_code = ?");
            params_vec.push(Box::new(status.clone()));
        }
        if filter.open_only {
            sql.push_str(" AND a.status_code != ?");
            params_vec.push(Box::new(ACTIVITY_STATUS_CLOSED.to_string()));
        }
        if let Some(project_id) = filter.project_id {
            sql.push_str(" AND a.project_id = ?");
            params_vec.push(Box::new(project_id));
        }
        if let Some(member_id) = filter.assigned_member_id {
            sql.push_str(" AND a.assigned_member_id = ?");
            params_vec.push(Box::new(member_id));
        }
        if let Some(ref title) = filter.title_like {
            sql.push_str(" AND a.title LIKE ? ESCAPE '\\'");
            params_vec.push(Box::new(like_pattern(title)));
        }
        sql.push_str(" ORDER BY a.created_at DESC, a.id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(params_refs.as_slice(), activity_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_activity(&self, id: i64) -> RepoResult<Activity> {
        self.find_activity(id)?
            .ok_or(RepoError::NotFound { entity: "activity", id })
    }

    pub fn find_activity(&self, id: i64) -> RepoResult<Option<Activity>> {
        let sql = format!("{} WHERE a.id = ?1", ACTIVITY_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![id], activity_from_row)
            .optional()?)
    }

    /// Create an activity; creating it closed stamps the end date
    pub fn create_activity(&mut self, input: &ActivityInput) -> RepoResult<Activity> {
        let today = self.today();
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        let clean = validate_activity(&tx, input, today)?;
        let end_date = rules::end_date_after_transition(None, &clean.status_code, None, now);

        tx.execute(
            "INSERT INTO activities (type_code, subtype_code, status_code, title, ticket_code,
                                     assigned_member_id, project_id, target_release_id, start_date,
                                     end_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                clean.type_code,
                clean.subtype_code,
                clean.status_code,
                clean.title,
                clean.ticket_code,
                clean.assigned_member_id,
                clean.project_id,
                clean.target_release_id,
                clean.start_date,
                end_date,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(id, title = %clean.title, "created activity");
        self.get_activity(id)
    }

    /// Update an activity, applying the close/reopen end-date rule
    pub fn update_activity(&mut self, id: i64, input: &ActivityInput) -> RepoResult<Activity> {
        let existing = self.get_activity(id)?;
        let today = self.today();
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        let clean = validate_activity(&tx, input, today)?;
        let mut next = existing.clone();
        rules::apply_activity_status(&mut next, &clean.status_code, now);
        let end_date: Option<DateTime<Utc>> = next.end_date;

        tx.execute(
            "UPDATE activities SET type_code = ?1, subtype_code = ?2, status_code = ?3, title = ?4,
                    ticket_code = ?5, assigned_member_id = ?6, project_id = ?7,
                    target_release_id = ?8, start_date = ?9, end_date = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                clean.type_code,
                clean.subtype_code,
                clean.status_code,
                clean.title,
                clean.ticket_code,
                clean.assigned_member_id,
                clean.project_id,
                clean.target_release_id,
                clean.start_date,
                end_date,
                now,
                id
            ],
        )?;
        tx.commit()?;

        if existing.status_code != clean.status_code {
            tracing::info!(
                id,
                from = %existing.status_code,
                to = %clean.status_code,
                "activity status changed"
            );
        } else {
            tracing::info!(id, "updated activity");
        }
        self.get_activity(id)
    }

    /// Delete an activity and its links
    pub fn delete_activity(&mut self, id: i64) -> RepoResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(RepoError::NotFound { entity: "activity", id });
        }
        tracing::info!(id, "deleted activity");
        Ok(())
    }

    /// (id, title) pairs ordered by title
    pub fn activity_options(&self) -> RepoResult<Vec<(i64, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM activities ORDER BY title COLLATE NOCASE, id")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
