//! Release repository

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{like_pattern, required_text, RepoError, RepoResult, Store};
use crate::core::rules::{self, ReleaseStatus};
use crate::entities::{Release, ReleaseDates, ReleaseFilter};

const RELEASE_COLUMNS: &str = "id, release_code, status_code, delivery_date, start_date, installation_date, created_at, updated_at";

fn release_from_row(row: &Row) -> rusqlite::Result<Release> {
    let mut release = Release {
        id: row.get(0)?,
        release_code: row.get(1)?,
        status_code: row.get(2)?,
        delivery_date: row.get(3)?,
        start_date: row.get(4)?,
        installation_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        status_name: String::new(),
    };
    release.resolve_names();
    Ok(release)
}

fn validate_dates(dates: &ReleaseDates) -> RepoResult<()> {
    if dates.installation_date < dates.start_date {
        return Err(RepoError::invalid(
            "Installation date is before the start date.",
        ));
    }
    Ok(())
}

impl Store {
    /// List releases ordered by code
    pub fn list_releases(&self, filter: &ReleaseFilter) -> RepoResult<Vec<Release>> {
        let mut sql = format!("SELECT {} FROM releases WHERE 1=1", RELEASE_COLUMNS);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(ref code) = filter.code_like {
            sql.push_str(" AND release_code LIKE ? ESCAPE '\\'");
            params_vec.push(Box::new(like_pattern(code)));
        }
        if let Some(ref status) = filter.status_code {
            sql.push_str(" AND status_code = ?");
            params_vec.push(Box::new(status.clone()));
        }
        sql.push_str(" ORDER BY release_code");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(params_refs.as_slice(), release_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_release(&self, id: i64) -> RepoResult<Release> {
        self.find_release(id)?
            .ok_or(RepoError::NotFound { entity: "release", id })
    }

    pub fn find_release(&self, id: i64) -> RepoResult<Option<Release>> {
        let sql = format!("SELECT {} FROM releases WHERE id = ?1", RELEASE_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], release_from_row)
            .optional()?)
    }

    pub fn find_release_by_code(&self, code: &str) -> RepoResult<Option<Release>> {
        let sql = format!(
            "SELECT {} FROM releases WHERE release_code = ?1",
            RELEASE_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![code.trim()], release_from_row)
            .optional()?)
    }

    /// Create a release; its status is derived from the dates
    pub fn create_release(&mut self, release_code: &str, dates: &ReleaseDates) -> RepoResult<Release> {
        let code = required_text(release_code, "Release code is required.")?;
        validate_dates(dates)?;
        if self.find_release_by_code(&code)?.is_some() {
            return Err(RepoError::invalid(format!("Release code {} already exists.", code)));
        }

        let status = rules::release_status_for_dates(dates.start_date, dates.installation_date, self.today());
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO releases (release_code, status_code, delivery_date, start_date, installation_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                code,
                status.code(),
                dates.delivery_date,
                dates.start_date,
                dates.installation_date,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(id, code = %code, %status, "created release");
        self.get_release(id)
    }

    /// Update a release's dates; installed releases are frozen
    pub fn update_release(&mut self, id: i64, dates: &ReleaseDates) -> RepoResult<Release> {
        let existing = self.get_release(id)?;
        if existing.status_on(self.today()) == ReleaseStatus::Installed {
            return Err(RepoError::invalid(format!(
                "Release {} is INSTALLED and cannot be edited.",
                existing.release_code
            )));
        }
        validate_dates(dates)?;

        let status = rules::release_status_for_dates(dates.start_date, dates.installation_date, self.today());
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE releases SET delivery_date = ?1, start_date = ?2, installation_date = ?3,
                    status_code = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                dates.delivery_date,
                dates.start_date,
                dates.installation_date,
                status.code(),
                now,
                id
            ],
        )?;
        tx.commit()?;

        tracing::info!(id, %status, "updated release");
        self.get_release(id)
    }

    /// Delete a release and its links; referencing projects and activities
    /// lose their target release
    pub fn delete_release(&mut self, id: i64) -> RepoResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM releases WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(RepoError::NotFound { entity: "release", id });
        }
        tracing::info!(id, "deleted release");
        Ok(())
    }

    /// (id, code) pairs of releases that can still be targeted
    pub fn release_options(&self) -> RepoResult<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, release_code FROM releases WHERE installation_date > ?1 ORDER BY release_code",
        )?;
        let rows = stmt.query_map(params![self.today()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Fail unless `id` names an existing release that is not installed as of `today`
    ///
    /// Decided from the stored dates, so a stale `status_code` cannot let an
    /// installed release through.
    pub(super) fn ensure_targetable_release(
        conn: &rusqlite::Connection,
        id: i64,
        today: NaiveDate,
    ) -> RepoResult<()> {
        let window: Option<(NaiveDate, NaiveDate)> = conn
            .query_row(
                "SELECT start_date, installation_date FROM releases WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match window {
            Some((start, installation))
                if rules::release_status_for_dates(start, installation, today)
                    != ReleaseStatus::Installed =>
            {
                Ok(())
            }
            Some(_) => Err(RepoError::invalid(
                "Invalid target release (INSTALLED releases cannot be targeted).",
            )),
            None => Err(RepoError::invalid(format!("Target release {} does not exist.", id))),
        }
    }
}
