//! Member repository

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{ensure_index_code, like_pattern, required_text, RepoError, RepoResult, Store};
use crate::core::index::{IndexTable, USER_STATUS_ACTIVE};
use crate::entities::{Member, MemberFilter, MemberInput};

const MEMBER_COLUMNS: &str = "id, name, role_code, status_code, vacation_start, vacation_end, created_at, updated_at";

fn member_from_row(row: &Row) -> rusqlite::Result<Member> {
    let mut member = Member {
        id: row.get(0)?,
        name: row.get(1)?,
        role_code: row.get(2)?,
        status_code: row.get(3)?,
        vacation_start: row.get(4)?,
        vacation_end: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        role_name: String::new(),
        status_name: String::new(),
    };
    member.resolve_names();
    Ok(member)
}

/// Validate a member input, returning the cleaned copy to persist
fn validate_member(conn: &rusqlite::Connection, input: &MemberInput) -> RepoResult<MemberInput> {
    let name = required_text(&input.name, "Name is required.")?;
    ensure_index_code(conn, IndexTable::Role, &input.role_code)?;
    ensure_index_code(conn, IndexTable::UserStatus, &input.status_code)?;

    if let (Some(start), Some(end)) = (input.vacation_start, input.vacation_end) {
        if end < start {
            return Err(RepoError::invalid("Vacation end date is before the start date."));
        }
    }

    // Active members never keep a vacation window
    let (vacation_start, vacation_end) = if input.status_code == USER_STATUS_ACTIVE {
        (None, None)
    } else {
        (input.vacation_start, input.vacation_end)
    };

    Ok(MemberInput {
        name,
        role_code: input.role_code.clone(),
        status_code: input.status_code.clone(),
        vacation_start,
        vacation_end,
    })
}

impl Store {
    /// List members ordered by name
    pub fn list_members(&self, filter: &MemberFilter) -> RepoResult<Vec<Member>> {
        let mut sql = format!("SELECT {} FROM members WHERE 1=1", MEMBER_COLUMNS);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(ref name) = filter.name_like {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
            params_vec.push(Box::new(like_pattern(name)));
        }
        if let Some(ref role) = filter.role_code {
            sql.push_str(" AND role_code = ?");
            params_vec.push(Box::new(role.clone()));
        }
        if let Some(ref status) = filter.status_code {
            sql.push_str(" AND status_code = ?");
            params_vec.push(Box::new(status.clone()));
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE, id");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(params_refs.as_slice(), member_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_member(&self, id: i64) -> RepoResult<Member> {
        self.find_member(id)?
            .ok_or(RepoError::NotFound { entity: "member", id })
    }

    pub fn find_member(&self, id: i64) -> RepoResult<Option<Member>> {
        let sql = format!("SELECT {} FROM members WHERE id = ?1", MEMBER_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], member_from_row)
            .optional()?)
    }

    pub fn create_member(&mut self, input: &MemberInput) -> RepoResult<Member> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        let clean = validate_member(&tx, input)?;

        tx.execute(
            "INSERT INTO members (name, role_code, status_code, vacation_start, vacation_end, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                clean.name,
                clean.role_code,
                clean.status_code,
                clean.vacation_start,
                clean.vacation_end,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(id, name = %clean.name, "created member");
        self.get_member(id)
    }

    pub fn update_member(&mut self, id: i64, input: &MemberInput) -> RepoResult<Member> {
        self.get_member(id)?;
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        let clean = validate_member(&tx, input)?;

        tx.execute(
            "UPDATE members SET name = ?1, role_code = ?2, status_code = ?3,
                    vacation_start = ?4, vacation_end = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                clean.name,
                clean.role_code,
                clean.status_code,
                clean.vacation_start,
                clean.vacation_end,
                now,
                id
            ],
        )?;
        tx.commit()?;

        tracing::info!(id, "updated member");
        self.get_member(id)
    }

    /// Delete a member; their activities become unassigned
    pub fn delete_member(&mut self, id: i64) -> RepoResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM members WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(RepoError::NotFound { entity: "member", id });
        }
        tracing::info!(id, "deleted member");
        Ok(())
    }

    /// (id, name) pairs for assignee pickers
    pub fn member_options(&self) -> RepoResult<Vec<(i64, String)>> {
        Ok(self
            .list_members(&MemberFilter::default())?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect())
    }
}
