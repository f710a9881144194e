//! SQLite-backed entity repository
//!
//! The store owns one connection for the lifetime of a CLI invocation or an
//! HTTP request. It:
//! - Creates the schema and seeds the reference tables on open
//! - Validates every create/update against the entity rules
//! - Runs each mutation in its own transaction
//! - Keeps `created_at` / `updated_at` current
//!
//! Validation failures are reported as [`RepoError::InvalidInput`] with a
//! message meant to be shown back to the user as-is.

mod activities;
mod links;
mod members;
mod projects;
mod releases;
mod schema;

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate, Utc};
use miette::Diagnostic;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::core::index::IndexTable;
use crate::core::rules;

/// Current schema version, recorded in `schema_version`
const SCHEMA_VERSION: i32 = 1;

/// Repository errors
#[derive(Debug, Error, Diagnostic)]
pub enum RepoError {
    /// Input failed validation; the message is user-facing
    #[error("{0}")]
    #[diagnostic(code(epm::invalid_input))]
    InvalidInput(String),

    #[error("{entity} {id} not found")]
    #[diagnostic(code(epm::not_found))]
    NotFound { entity: &'static str, id: i64 },

    #[error("database schema version {found} is newer than this build supports ({supported})")]
    #[diagnostic(
        code(epm::schema_version),
        help("upgrade epm or point --db at another database")
    )]
    SchemaTooNew { found: i32, supported: i32 },

    #[error("database error: {0}")]
    #[diagnostic(code(epm::database))]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(epm::io))]
    Io(#[from] std::io::Error),
}

impl RepoError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RepoError::InvalidInput(message.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RepoError::InvalidInput(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// The entity store
pub struct Store {
    conn: Connection,
    /// Fixed "today" for status derivation; `None` uses the local date
    today: Option<NaiveDate>,
}

impl Store {
    /// Open (or create) the database at `path`
    ///
    /// The schema is created if missing and the reference tables are seeded
    /// with any codes they do not have yet.
    pub fn open(path: &Path) -> RepoResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> RepoResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut store = Self { conn, today: None };
        store.init_schema()?;
        store.seed_index_tables()?;
        Ok(store)
    }

    /// Pin the date used for status derivation
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// The date statuses are derived against
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn schema_version(&self) -> RepoResult<i32> {
        let version = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get::<_, Option<i32>>(0)
            })?
            .unwrap_or(0);
        Ok(version)
    }

    /// Insert missing reference codes; existing rows are left untouched
    fn seed_index_tables(&mut self) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        for table in IndexTable::ALL {
            let sql = format!(
                "INSERT OR IGNORE INTO {} (code, name) VALUES (?1, ?2)",
                table.table_name()
            );
            let mut stmt = tx.prepare(&sql)?;
            for (code, name) in table.rows() {
                stmt.execute(params![code, name])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Code/name pairs of a reference table, ordered by code
    pub fn index_options(&self, table: IndexTable) -> RepoResult<Vec<(String, String)>> {
        let sql = format!(
            "SELECT code, name FROM {} ORDER BY code",
            table.table_name()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Re-derive every release status from today's date
    ///
    /// Only releases whose status actually changes are written (and get a new
    /// `updated_at`). Returns the number of releases changed.
    pub fn refresh_release_statuses(&mut self) -> RepoResult<usize> {
        let today = self.today();
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        let releases: Vec<(i64, String, NaiveDate, NaiveDate)> = {
            let mut stmt =
                tx.prepare("SELECT id, status_code, start_date, installation_date FROM releases")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let mut changed = 0;
        for (id, status_code, start, installation) in releases {
            let derived = rules::release_status_for_dates(start, installation, today);
            if status_code != derived.code() {
                tx.execute(
                    "UPDATE releases SET status_code = ?1, updated_at = ?2 WHERE id = ?3",
                    params![derived.code(), now, id],
                )?;
                changed += 1;
            }
        }
        tx.commit()?;

        if changed > 0 {
            tracing::debug!(changed, %today, "refreshed release statuses");
        }
        Ok(changed)
    }
}

/// Fail unless `code` exists in the given reference table
fn ensure_index_code(conn: &Connection, table: IndexTable, code: &str) -> RepoResult<()> {
    if code.trim().is_empty() {
        return Err(RepoError::invalid(format!("{} is required.", capitalize(table.label()))));
    }
    let sql = format!("SELECT 1 FROM {} WHERE code = ?1", table.table_name());
    let exists = conn
        .query_row(&sql, params![code], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        return Err(RepoError::invalid(format!(
            "Invalid {} code: {}.",
            table.label(),
            code
        )));
    }
    Ok(())
}

/// Trim a required text field, failing with `message` when blank
fn required_text(value: &str, message: &str) -> RepoResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RepoError::invalid(message));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank becomes `None`
fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Escape LIKE wildcards in user input and wrap it for substring matching
fn like_pattern(value: &str) -> String {
    let escaped = value
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests;
