//! Database schema initialization

use rusqlite::params;

use super::{RepoError, RepoResult, Store, SCHEMA_VERSION};
use crate::core::index::IndexTable;

impl Store {
    /// Create all tables if they do not exist and record the schema version
    pub(super) fn init_schema(&mut self) -> RepoResult<()> {
        let found = self.stored_schema_version()?;
        if found > SCHEMA_VERSION {
            return Err(RepoError::SchemaTooNew {
                found,
                supported: SCHEMA_VERSION,
            });
        }

        let tx = self.conn.transaction()?;

        tx.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );
            "#,
        )?;

        for table in IndexTable::ALL {
            tx.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    code TEXT PRIMARY KEY CHECK (length(code) <= 3),
                    name TEXT NOT NULL
                );",
                table.table_name()
            ))?;
        }

        tx.execute_batch(
            r#"
            -- Team members
            CREATE TABLE IF NOT EXISTS members (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                role_code TEXT NOT NULL REFERENCES index_role(code),
                status_code TEXT NOT NULL REFERENCES index_user_status(code),
                vacation_start TEXT,
                vacation_end TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_members_role ON members(role_code);
            CREATE INDEX IF NOT EXISTS idx_members_status ON members(status_code);

            -- Releases
            CREATE TABLE IF NOT EXISTS releases (
                id INTEGER PRIMARY KEY,
                release_code TEXT NOT NULL UNIQUE,
                status_code TEXT NOT NULL REFERENCES index_release_status(code),
                delivery_date TEXT NOT NULL,
                start_date TEXT NOT NULL,
                installation_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_releases_status ON releases(status_code);

            CREATE TABLE IF NOT EXISTS release_links (
                id INTEGER PRIMARY KEY,
                release_id INTEGER NOT NULL REFERENCES releases(id) ON DELETE CASCADE,
                label TEXT NOT NULL,
                type_code TEXT NOT NULL REFERENCES index_link_type(code),
                url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_release_links_release ON release_links(release_id);

            -- Projects
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY,
                project_code TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                pm_responsible TEXT NOT NULL,
                eba_responsible TEXT NOT NULL,
                status_code TEXT NOT NULL REFERENCES index_project_status(code),
                e2e_date TEXT,
                target_release_id INTEGER REFERENCES releases(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status_code);
            CREATE INDEX IF NOT EXISTS idx_projects_target_release ON projects(target_release_id);

            -- Activities
            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY,
                type_code TEXT NOT NULL REFERENCES index_activity_type(code),
                subtype_code TEXT NOT NULL REFERENCES index_activity_subtype(code),
                status_code TEXT NOT NULL REFERENCES index_activity_status(code),
                title TEXT NOT NULL,
                ticket_code TEXT,
                assigned_member_id INTEGER REFERENCES members(id) ON DELETE SET NULL,
                project_id INTEGER REFERENCES projects(id) ON DELETE SET NULL,
                target_release_id INTEGER REFERENCES releases(id) ON DELETE SET NULL,
                start_date TEXT,
                end_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_activities_status ON activities(status_code);
            CREATE INDEX IF NOT EXISTS idx_activities_assigned ON activities(assigned_member_id);
            CREATE INDEX IF NOT EXISTS idx_activities_project ON activities(project_id);
            CREATE INDEX IF NOT EXISTS idx_activities_target_release ON activities(target_release_id);

            CREATE TABLE IF NOT EXISTS activity_links (
                id INTEGER PRIMARY KEY,
                activity_id INTEGER NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
                label TEXT NOT NULL,
                type_code TEXT NOT NULL REFERENCES index_link_type(code),
                url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_activity_links_activity ON activity_links(activity_id);
            "#,
        )?;

        tx.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Version recorded in an existing database, 0 for a fresh one
    fn stored_schema_version(&self) -> RepoResult<i32> {
        let has_table: bool = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get::<_, i64>(0).map(|n| n > 0),
        )?;
        if !has_table {
            return Ok(0);
        }
        self.schema_version()
    }
}
