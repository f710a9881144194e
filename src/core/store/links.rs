//! Link repository, shared by release and activity links

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{ensure_index_code, required_text, RepoError, RepoResult, Store};
use crate::core::index::IndexTable;
use crate::entities::{Link, LinkInput, LinkOwner};

fn link_from_row(row: &Row) -> rusqlite::Result<Link> {
    let mut link = Link {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        label: row.get(2)?,
        type_code: row.get(3)?,
        url: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        type_name: String::new(),
    };
    link.resolve_names();
    Ok(link)
}

fn validate_link(conn: &rusqlite::Connection, input: &LinkInput) -> RepoResult<LinkInput> {
    let label = required_text(&input.label, "Link label is required.")?;
    let url = required_text(&input.url, "Link URL is required.")?;
    let lower = url.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(RepoError::invalid(
            "Invalid link URL (must start with http:// or https://).",
        ));
    }
    ensure_index_code(conn, IndexTable::LinkType, &input.type_code)?;

    Ok(LinkInput {
        label,
        type_code: input.type_code.clone(),
        url,
    })
}

impl Store {
    fn ensure_link_owner(&self, owner: LinkOwner, owner_id: i64) -> RepoResult<()> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1", owner.owner_table());
        let exists = self
            .conn
            .query_row(&sql, params![owner_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(RepoError::NotFound {
                entity: owner.entity_name(),
                id: owner_id,
            });
        }
        Ok(())
    }

    /// Links of one release or activity, oldest first
    pub fn list_links(&self, owner: LinkOwner, owner_id: i64) -> RepoResult<Vec<Link>> {
        self.ensure_link_owner(owner, owner_id)?;
        let sql = format!(
            "SELECT id, {col}, label, type_code, url, created_at, updated_at
             FROM {table} WHERE {col} = ?1 ORDER BY id",
            col = owner.owner_column(),
            table = owner.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner_id], link_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn add_link(&mut self, owner: LinkOwner, owner_id: i64, input: &LinkInput) -> RepoResult<Link> {
        self.ensure_link_owner(owner, owner_id)?;
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        let clean = validate_link(&tx, input)?;
        tx.execute(
            &format!(
                "INSERT INTO {} ({}, label, type_code, url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                owner.table(),
                owner.owner_column()
            ),
            params![owner_id, clean.label, clean.type_code, clean.url, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(%owner, owner_id, id, "added link");
        self.list_links(owner, owner_id)?
            .into_iter()
            .find(|link| link.id == id)
            .ok_or(RepoError::NotFound { entity: "link", id })
    }

    /// Delete a link; it must belong to the given owner
    pub fn delete_link(&mut self, owner: LinkOwner, owner_id: i64, link_id: i64) -> RepoResult<()> {
        let deleted = self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE id = ?1 AND {} = ?2",
                owner.table(),
                owner.owner_column()
            ),
            params![link_id, owner_id],
        )?;
        if deleted == 0 {
            return Err(RepoError::NotFound { entity: "link", id: link_id });
        }
        tracing::info!(%owner, owner_id, id = link_id, "deleted link");
        Ok(())
    }
}
