//! Note/tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Expose note-oriented use-cases (list, find, save, update, delete,
//!   clear tags) over `NoteStore` and `TagStore`.
//! - Own the unit-of-work boundary for every association change.
//!
//! # Invariants
//! - Each mutating call runs in one `BEGIN IMMEDIATE` transaction; an error
//!   drops the transaction and rolls everything back.
//! - Tags are resolved before the note row that references them is written.
//! - Orphan tags are pruned before commit whenever an association was removed.
//! - Notes of another owner are reported as `NotFound`, never as forbidden.

use crate::model::note::{Note, NoteDraft, NoteId, Tag, TagId};
use crate::model::now_epoch_ms;
use crate::repo::ensure_tables;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::note_store::NoteStore;
use crate::repo::pagination::{PageResult, Pagination};
use crate::repo::tag_store::TagStore;
use log::debug;
use rusqlite::{Connection, TransactionBehavior};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Repository interface for notes/tags operations.
pub trait NoteRepository {
    /// Lists one page of the owner's notes.
    fn list_notes(&self, user_id: &str, page: Pagination) -> RepoResult<PageResult<Note>>;
    /// Lists one page of the owner's notes carrying the exact tag name.
    ///
    /// An unknown tag name yields an empty page with `total_count == 0`.
    fn list_notes_by_tag(
        &self,
        user_id: &str,
        tag_name: &str,
        page: Pagination,
    ) -> RepoResult<PageResult<Note>>;
    /// Gets one note by id.
    fn find_note(&self, user_id: &str, note_id: NoteId) -> RepoResult<Note>;
    /// Creates a note and its tag associations; returns the stored note.
    fn save_note(&mut self, user_id: &str, draft: &NoteDraft) -> RepoResult<Note>;
    /// Replaces editable fields and the whole tag set; returns the stored note.
    fn update_note(&mut self, user_id: &str, note_id: NoteId, draft: &NoteDraft)
        -> RepoResult<Note>;
    /// Deletes a note and prunes tags it alone referenced.
    fn delete_note(&mut self, user_id: &str, note_id: NoteId) -> RepoResult<()>;
    /// Removes every tag from a note and prunes resulting orphans.
    fn clear_note_tags(&mut self, user_id: &str, note_id: NoteId) -> RepoResult<()>;
    /// Returns all canonical tags sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
}

/// SQLite-backed notes/tags repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["notes", "tags", "note_tags"])?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn list_notes(&self, user_id: &str, page: Pagination) -> RepoResult<PageResult<Note>> {
        NoteStore::new(self.conn).list(user_id, page)
    }

    fn list_notes_by_tag(
        &self,
        user_id: &str,
        tag_name: &str,
        page: Pagination,
    ) -> RepoResult<PageResult<Note>> {
        match TagStore::new(self.conn).find_by_name(tag_name)? {
            Some(tag) => NoteStore::new(self.conn).list_by_tag(user_id, tag.id, page),
            None => Ok(PageResult::empty()),
        }
    }

    fn find_note(&self, user_id: &str, note_id: NoteId) -> RepoResult<Note> {
        NoteStore::new(self.conn)
            .find(user_id, note_id)?
            .ok_or_else(|| RepoError::note_not_found(note_id))
    }

    fn save_note(&mut self, user_id: &str, draft: &NoteDraft) -> RepoResult<Note> {
        draft.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let tags = TagStore::new(&tx);
        let notes = NoteStore::new(&tx);

        let resolved = tags.resolve_or_create(&draft.tag_set())?;
        let now = now_epoch_ms();
        let note = Note {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            memo_date: draft.memo_date,
            created_at: now,
            updated_at: now,
            tags: resolved,
        };
        notes.insert(&note)?;
        notes.attach(note.id, &tag_ids(&note.tags))?;

        tx.commit()?;
        debug!(
            "event=note_save module=repo status=ok note_id={} tag_count={}",
            note.id,
            note.tags.len()
        );
        Ok(note)
    }

    fn update_note(
        &mut self,
        user_id: &str,
        note_id: NoteId,
        draft: &NoteDraft,
    ) -> RepoResult<Note> {
        draft.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let tags = TagStore::new(&tx);
        let notes = NoteStore::new(&tx);

        let current = notes
            .find(user_id, note_id)?
            .ok_or_else(|| RepoError::note_not_found(note_id))?;
        notes.update_fields(user_id, note_id, draft, now_epoch_ms())?;

        let requested = draft.tag_set();
        let current_names: BTreeSet<String> =
            current.tags.iter().map(|tag| tag.name.clone()).collect();
        let to_remove: Vec<TagId> = current
            .tags
            .iter()
            .filter(|tag| !requested.contains(&tag.name))
            .map(|tag| tag.id)
            .collect();
        let to_add: BTreeSet<String> = requested.difference(&current_names).cloned().collect();

        let detached = notes.detach(note_id, &to_remove)?;
        let mut pruned = tags.prune_orphans()?;
        let added = tags.resolve_or_create(&to_add)?;
        notes.attach(note_id, &tag_ids(&added))?;
        pruned += tags.prune_orphans()?;

        let updated = notes
            .find(user_id, note_id)?
            .ok_or_else(|| RepoError::note_not_found(note_id))?;
        tx.commit()?;

        debug!(
            "event=note_update module=repo status=ok note_id={} detached={} attached={} pruned={}",
            note_id,
            detached,
            added.len(),
            pruned
        );
        Ok(updated)
    }

    fn delete_note(&mut self, user_id: &str, note_id: NoteId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let tags = TagStore::new(&tx);
        let notes = NoteStore::new(&tx);

        if notes.find(user_id, note_id)?.is_none() {
            return Err(RepoError::note_not_found(note_id));
        }
        let detached = notes.detach_all(note_id)?;
        notes.delete(user_id, note_id)?;
        let pruned = tags.prune_orphans()?;

        tx.commit()?;
        debug!(
            "event=note_delete module=repo status=ok note_id={} detached={} pruned={}",
            note_id, detached, pruned
        );
        Ok(())
    }

    fn clear_note_tags(&mut self, user_id: &str, note_id: NoteId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let tags = TagStore::new(&tx);
        let notes = NoteStore::new(&tx);

        if !notes.touch(user_id, note_id, now_epoch_ms())? {
            return Err(RepoError::note_not_found(note_id));
        }
        let detached = notes.detach_all(note_id)?;
        let pruned = tags.prune_orphans()?;

        tx.commit()?;
        debug!(
            "event=note_clear_tags module=repo status=ok note_id={} detached={} pruned={}",
            note_id, detached, pruned
        );
        Ok(())
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        TagStore::new(self.conn).list_all()
    }
}

fn tag_ids(tags: &[Tag]) -> Vec<TagId> {
    tags.iter().map(|tag| tag.id).collect()
}
