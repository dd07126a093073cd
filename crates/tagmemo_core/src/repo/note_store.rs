//! Note rows and note-tag associations.
//!
//! # Responsibility
//! - Read/write `notes` rows scoped by owner.
//! - Attach/detach rows in the `note_tags` association relation.
//!
//! # Invariants
//! - Every statement filters by `user_id`; another owner's note behaves as
//!   absent.
//! - Lists are ordered by `updated_at DESC, id ASC`.
//! - This store never creates or deletes tags; see `TagStore`.

use crate::model::note::{Note, NoteDraft, NoteId, TagId};
use crate::repo::error::RepoResult;
use crate::repo::pagination::{PageResult, Pagination};
use crate::repo::parse_uuid;
use crate::repo::tag_store::TagStore;
use rusqlite::{params, Connection, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    content,
    memo_date,
    created_at,
    updated_at
FROM notes";

/// Note persistence bound to one connection or open transaction.
pub struct NoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> NoteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Lists one page of the owner's notes plus the unpaginated total.
    pub fn list(&self, user_id: &str, page: Pagination) -> RepoResult<PageResult<Note>> {
        let total_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notes WHERE user_id = ?1;",
            [user_id],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare_cached(&format!(
            "{NOTE_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY updated_at DESC, id ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![user_id, page.limit(), page.offset()])?;
        let items = self.collect_notes(&mut rows)?;

        Ok(PageResult {
            total_count: total_count as u64,
            items,
        })
    }

    /// Lists one page of the owner's notes attached to `tag_id`.
    pub fn list_by_tag(
        &self,
        user_id: &str,
        tag_id: TagId,
        page: Pagination,
    ) -> RepoResult<PageResult<Note>> {
        let tag_id = tag_id.to_string();
        let total_count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM notes n
             INNER JOIN note_tags nt ON nt.note_id = n.id
             WHERE n.user_id = ?1 AND nt.tag_id = ?2;",
            params![user_id, tag_id],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare_cached(&format!(
            "{NOTE_SELECT_SQL}
             WHERE user_id = ?1
               AND EXISTS (
                   SELECT 1 FROM note_tags nt
                   WHERE nt.note_id = notes.id AND nt.tag_id = ?2
               )
             ORDER BY updated_at DESC, id ASC
             LIMIT ?3 OFFSET ?4;"
        ))?;
        let mut rows = stmt.query(params![user_id, tag_id, page.limit(), page.offset()])?;
        let items = self.collect_notes(&mut rows)?;

        Ok(PageResult {
            total_count: total_count as u64,
            items,
        })
    }

    /// Loads one note with its tags, or `None` when the owner has no such note.
    pub fn find(&self, user_id: &str, note_id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "{NOTE_SELECT_SQL} WHERE id = ?1 AND user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![note_id.to_string(), user_id])?;
        match rows.next()? {
            Some(row) => {
                let mut note = parse_note_row(row)?;
                note.tags = TagStore::new(self.conn).tags_for_note(note.id)?;
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    /// Inserts the note row only; associations are attached separately.
    pub fn insert(&self, note: &Note) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO notes (id, user_id, title, content, memo_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                note.id.to_string(),
                note.user_id,
                note.title,
                note.content,
                note.memo_date,
                note.created_at,
                note.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Overwrites editable fields. Returns `false` when nothing matched.
    pub fn update_fields(
        &self,
        user_id: &str,
        note_id: NoteId,
        draft: &NoteDraft,
        updated_at: i64,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET title = ?3, content = ?4, memo_date = ?5, updated_at = ?6
             WHERE id = ?1 AND user_id = ?2;",
            params![
                note_id.to_string(),
                user_id,
                draft.title,
                draft.content,
                draft.memo_date,
                updated_at,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Refreshes `updated_at` only. Returns `false` when nothing matched.
    pub fn touch(&self, user_id: &str, note_id: NoteId, updated_at: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE notes SET updated_at = ?3 WHERE id = ?1 AND user_id = ?2;",
            params![note_id.to_string(), user_id, updated_at],
        )?;
        Ok(changed > 0)
    }

    /// Deletes the note row. Returns `false` when nothing matched.
    pub fn delete(&self, user_id: &str, note_id: NoteId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2;",
            params![note_id.to_string(), user_id],
        )?;
        Ok(changed > 0)
    }

    pub fn attach(&self, note_id: NoteId, tag_ids: &[TagId]) -> RepoResult<()> {
        let note_id = note_id.to_string();
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?1, ?2);",
        )?;
        for tag_id in tag_ids {
            stmt.execute(params![note_id, tag_id.to_string()])?;
        }
        Ok(())
    }

    pub fn detach(&self, note_id: NoteId, tag_ids: &[TagId]) -> RepoResult<usize> {
        let note_id = note_id.to_string();
        let mut stmt = self
            .conn
            .prepare_cached("DELETE FROM note_tags WHERE note_id = ?1 AND tag_id = ?2;")?;
        let mut removed = 0;
        for tag_id in tag_ids {
            removed += stmt.execute(params![note_id, tag_id.to_string()])?;
        }
        Ok(removed)
    }

    pub fn detach_all(&self, note_id: NoteId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM note_tags WHERE note_id = ?1;",
            [note_id.to_string()],
        )?;
        Ok(removed)
    }

    fn collect_notes(&self, rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Note>> {
        let tag_store = TagStore::new(self.conn);
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let mut note = parse_note_row(row)?;
            note.tags = tag_store.tags_for_note(note.id)?;
            notes.push(note);
        }
        Ok(notes)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    Ok(Note {
        id: parse_uuid(&id_text, "notes.id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        memo_date: row.get("memo_date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        tags: Vec::new(),
    })
}
