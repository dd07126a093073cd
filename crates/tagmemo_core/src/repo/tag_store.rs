//! Canonical tag rows: name resolution and orphan pruning.
//!
//! # Responsibility
//! - Resolve requested tag names into existing or newly created rows.
//! - Delete tags that no note references anymore.
//!
//! # Invariants
//! - `tags.name` is UNIQUE; a duplicate insert is resolved by re-fetching the
//!   existing row, never surfaced to callers.
//! - Name matching is exact and case-sensitive (`BINARY` collation).
//! - Callers run these operations inside the unit of work that changes
//!   associations, so new and pruned rows commit together with it.

use crate::model::note::{NoteId, Tag};
use crate::model::now_epoch_ms;
use crate::repo::error::{is_unique_violation, RepoError, RepoResult};
use crate::repo::parse_uuid;
use log::debug;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use uuid::Uuid;

const TAG_SELECT_SQL: &str = "SELECT id, name, created_at, updated_at FROM tags";

/// Tag persistence bound to one connection or open transaction.
pub struct TagStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TagStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Resolves every requested name to exactly one canonical row.
    ///
    /// Order of the returned tags follows the sorted input names.
    pub fn resolve_or_create(&self, names: &BTreeSet<String>) -> RepoResult<Vec<Tag>> {
        let now = now_epoch_ms();
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let tag = match self.find_by_name(name)? {
                Some(existing) => existing,
                None => self.insert_or_fetch(name, now)?,
            };
            resolved.push(tag);
        }
        Ok(resolved)
    }

    /// Inserts a new tag row, or returns the row another writer created first.
    pub(crate) fn insert_or_fetch(&self, name: &str, now: i64) -> RepoResult<Tag> {
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };

        match self.conn.execute(
            "INSERT INTO tags (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4);",
            params![tag.id.to_string(), tag.name, tag.created_at, tag.updated_at],
        ) {
            Ok(_) => {
                debug!("event=tag_create module=repo status=ok tag_id={}", tag.id);
                Ok(tag)
            }
            Err(err) if is_unique_violation(&err) => {
                debug!("event=tag_create module=repo status=conflict action=refetch");
                self.find_by_name(name)?
                    .ok_or_else(|| RepoError::ConstraintViolation(err.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{TAG_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_tag_row(row)?)),
            None => Ok(None),
        }
    }

    /// Returns tags attached to one note, sorted by name.
    pub fn tags_for_note(&self, note_id: NoteId) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT t.id, t.name, t.created_at, t.updated_at
             FROM note_tags nt
             INNER JOIN tags t ON t.id = nt.tag_id
             WHERE nt.note_id = ?1
             ORDER BY t.name ASC;",
        )?;
        let mut rows = stmt.query([note_id.to_string()])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    /// Returns every canonical tag, sorted by name.
    pub fn list_all(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TAG_SELECT_SQL} ORDER BY name ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    /// Deletes every tag with zero note associations and returns how many went.
    ///
    /// Full sweep over `tags`. Fine at personal-notes scale; a per-tag
    /// reference count would avoid the scan for large stores.
    pub fn prune_orphans(&self) -> RepoResult<usize> {
        let pruned = self.conn.execute(
            "DELETE FROM tags
             WHERE NOT EXISTS (
                SELECT 1 FROM note_tags nt WHERE nt.tag_id = tags.id
             );",
            [],
        )?;
        if pruned > 0 {
            debug!("event=tag_prune module=repo status=ok pruned={pruned}");
        }
        Ok(pruned)
    }
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let id_text: String = row.get("id")?;
    Ok(Tag {
        id: parse_uuid(&id_text, "tags.id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::TagStore;
    use crate::db::open_db_in_memory;
    use std::collections::BTreeSet;

    fn names(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn resolve_reuses_existing_rows() {
        let conn = open_db_in_memory().unwrap();
        let store = TagStore::new(&conn);

        let first = store.resolve_or_create(&names(&["go", "rust"])).unwrap();
        let second = store.resolve_or_create(&names(&["rust"])).unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(first[1].id, second[0].id);
        assert_eq!(store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn insert_conflict_refetches_existing_row() {
        let conn = open_db_in_memory().unwrap();
        let store = TagStore::new(&conn);
        let original = store.insert_or_fetch("rust", 1_000).unwrap();

        let again = store.insert_or_fetch("rust", 2_000).unwrap();

        assert_eq!(again, original);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn names_differing_only_by_case_are_distinct() {
        let conn = open_db_in_memory().unwrap();
        let store = TagStore::new(&conn);

        let tags = store.resolve_or_create(&names(&["Rust", "rust"])).unwrap();

        assert_eq!(tags.len(), 2);
        assert_ne!(tags[0].id, tags[1].id);
        assert!(store.find_by_name("RUST").unwrap().is_none());
    }

    #[test]
    fn prune_removes_only_unreferenced_tags() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO notes (id, user_id, title, content, memo_date, created_at, updated_at)
             VALUES ('00000000-0000-0000-0000-000000000001', 'u', 't', 'c', '2024-01-01', 1, 1);",
        )
        .unwrap();
        let store = TagStore::new(&conn);
        let tags = store.resolve_or_create(&names(&["kept", "orphan"])).unwrap();
        conn.execute(
            "INSERT INTO note_tags (note_id, tag_id) VALUES (?1, ?2);",
            [
                "00000000-0000-0000-0000-000000000001".to_string(),
                tags[0].id.to_string(),
            ],
        )
        .unwrap();

        assert_eq!(store.prune_orphans().unwrap(), 1);
        let remaining = store.list_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "kept");
    }
}
