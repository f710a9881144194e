//! Project repository

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{ensure_index_code, like_pattern, RepoError, RepoResult, Store};
use crate::core::index::{IndexTable, PROJECT_STATUS_CLOSED};
use crate::core::rules;
use crate::entities::{Project, ProjectFilter, ProjectInput};

const PROJECT_SELECT: &str = r#"SELECT p.id, p.project_code, p.title, p.pm_responsible, p.eba_responsible,
           p.status_code, p.e2e_date, p.target_release_id, p.created_at, p.updated_at,
           r.release_code
    FROM projects p
    LEFT JOIN releases r ON r.id = p.target_release_id"#;

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    let mut project = Project {
        id: row.get(0)?,
        project_code: row.get(1)?,
        title: row.get(2)?,
        pm_responsible: row.get(3)?,
        eba_responsible: row.get(4)?,
        status_code: row.get(5)?,
        e2e_date: row.get(6)?,
        target_release_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        status_name: String::new(),
        target_release_code: row.get(10)?,
    };
    project.resolve_names();
    Ok(project)
}

fn validate_project(
    conn: &rusqlite::Connection,
    input: &ProjectInput,
    today: NaiveDate,
) -> RepoResult<ProjectInput> {
    let title = input.title.trim();
    let pm = input.pm_responsible.trim();
    let eba = input.eba_responsible.trim();
    if title.is_empty() || pm.is_empty() || eba.is_empty() {
        return Err(RepoError::invalid(
            "Title, PM responsible and EBA responsible are required.",
        ));
    }
    ensure_index_code(conn, IndexTable::ProjectStatus, &input.status_code)?;
    if let Some(release_id) = input.target_release_id {
        Store::ensure_targetable_release(conn, release_id, today)?;
    }

    Ok(ProjectInput {
        title: title.to_string(),
        pm_responsible: pm.to_string(),
        eba_responsible: eba.to_string(),
        status_code: input.status_code.clone(),
        e2e_date: input.e2e_date,
        target_release_id: input.target_release_id,
    })
}

impl Store {
    /// List projects ordered by code
    pub fn list_projects(&self, filter: &ProjectFilter) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{} WHERE 1=1", PROJECT_SELECT);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(ref search) = filter.search {
            sql.push_str(" AND (p.project_code LIKE ? ESCAPE '\\' OR p.title LIKE ? ESCAPE '\\')");
            let pattern = like_pattern(search);
            params_vec.push(Box::new(pattern.clone()));
            params_vec.push(Box::new(pattern));
        }
        if let Some(ref status) = filter.status_code {
            sql.push_str(" AND p.status_code = ?");
            params_vec.push(Box::new(status.clone()));
        }
        if let Some(release_id) = filter.target_release_id {
            sql.push_str(" AND p.target_release_id = ?");
            params_vec.push(Box::new(release_id));
        }
        sql.push_str(" ORDER BY p.project_code");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(params_refs.as_slice(), project_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_project(&self, id: i64) -> RepoResult<Project> {
        self.find_project(id)?
            .ok_or(RepoError::NotFound { entity: "project", id })
    }

    pub fn find_project(&self, id: i64) -> RepoResult<Option<Project>> {
        let sql = format!("{} WHERE p.id = ?1", PROJECT_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![id], project_from_row)
            .optional()?)
    }

    pub fn find_project_by_code(&self, code: &str) -> RepoResult<Option<Project>> {
        let sql = format!("{} WHERE p.project_code = ?1", PROJECT_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![code.trim()], project_from_row)
            .optional()?)
    }

    pub fn create_project(&mut self, project_code: &str, input: &ProjectInput) -> RepoResult<Project> {
        let code = project_code.trim();
        if !rules::project_code_is_valid(code) {
            return Err(RepoError::invalid(
                "Invalid project code (expected PR followed by digits).",
            ));
        }
        if self.find_project_by_code(code)?.is_some() {
            return Err(RepoError::invalid(format!("Project code {} already exists.", code)));
        }

        let today = self.today();
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        let clean = validate_project(&tx, input, today)?;
        tx.execute(
            "INSERT INTO projects (project_code, title, pm_responsible, eba_responsible, status_code,
                                   e2e_date, target_release_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                code,
                clean.title,
                clean.pm_responsible,
                clean.eba_responsible,
                clean.status_code,
                clean.e2e_date,
                clean.target_release_id,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(id, code, "created project");
        self.get_project(id)
    }

    pub fn update_project(&mut self, id: i64, input: &ProjectInput) -> RepoResult<Project> {
        self.get_project(id)?;
        let today = self.today();
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        let clean = validate_project(&tx, input, today)?;
        tx.execute(
            "UPDATE projects SET title = ?1, pm_responsible = ?2, eba_responsible = ?3,
                    status_code = ?4, e2e_date = ?5, target_release_id = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                clean.title,
                clean.pm_responsible,
                clean.eba_responsible,
                clean.status_code,
                clean.e2e_date,
                clean.target_release_id,
                now,
                id
            ],
        )?;
        tx.commit()?;

        tracing::info!(id, status = %clean.status_code, "updated project");
        self.get_project(id)
    }

    /// Delete a project; its activities are detached
    pub fn delete_project(&mut self, id: i64) -> RepoResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(RepoError::NotFound { entity: "project", id });
        }
        tracing::info!(id, "deleted project");
        Ok(())
    }

    /// (id, code) pairs of projects activities can still attach to
    pub fn project_options(&self) -> RepoResult<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_code FROM projects WHERE status_code != ?1 ORDER BY project_code",
        )?;
        let rows = stmt.query_map(params![PROJECT_STATUS_CLOSED], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Fail unless `id` names an existing project that is not closed
    pub(super) fn ensure_open_project(conn: &rusqlite::Connection, id: i64) -> RepoResult<()> {
        let status: Option<String> = conn
            .query_row(
                "SELECT status_code FROM projects WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match status {
            Some(code) if !rules::project_is_closed(&code) => Ok(()),
            Some(_) => Err(RepoError::invalid(
                "Invalid project (CLOSED projects cannot take activities).",
            )),
            None => Err(RepoError::invalid(format!("Project {} does not exist.", id))),
        }
    }
}
