//! Note use-case service.
//!
//! # Responsibility
//! - Provide the note entry points the transport layer calls.
//! - Validate drafts and pagination before touching storage.
//! - Translate repository errors into use-case errors.
//!
//! # Invariants
//! - Tag names are passed through verbatim; blank names are rejected, never
//!   trimmed or case-folded.
//! - `NoteNotFound` is the only error callers should show to end users.

use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError, Tag};
use crate::repo::error::RepoError;
use crate::repo::note_repo::NoteRepository;
use crate::repo::pagination::{PageResult, Pagination, PaginationError};
use log::error;
use thiserror::Error;

/// Service error for note use-cases.
#[derive(Debug, Error)]
pub enum NoteServiceError {
    #[error(transparent)]
    InvalidNote(#[from] NoteValidationError),
    #[error(transparent)]
    InvalidPage(#[from] PaginationError),
    #[error("note not found: {0}")]
    NoteNotFound(String),
    /// Persistence-layer failure; map to a generic server error.
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::NoteNotFound(id),
            RepoError::NoteValidation(err) => Self::InvalidNote(err),
            other => Self::Repo(other),
        }
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_note(&mut self, user_id: &str, draft: &NoteDraft) -> NoteServiceResult<Note> {
        draft.validate()?;
        self.repo
            .save_note(user_id, draft)
            .map_err(|err| failed("note_create", err))
    }

    pub fn get_note(&self, user_id: &str, note_id: NoteId) -> NoteServiceResult<Note> {
        self.repo
            .find_note(user_id, note_id)
            .map_err(|err| failed("note_get", err))
    }

    /// Lists the owner's notes, optionally restricted to one exact tag name.
    pub fn list_notes(
        &self,
        user_id: &str,
        tag: Option<&str>,
        page: u32,
        items_per_page: u32,
    ) -> NoteServiceResult<PageResult<Note>> {
        let page = Pagination::new(page, items_per_page)?;
        let result = match tag {
            Some(tag_name) => self.repo.list_notes_by_tag(user_id, tag_name, page),
            None => self.repo.list_notes(user_id, page),
        };
        result.map_err(|err| failed("note_list", err))
    }

    pub fn update_note(
        &mut self,
        user_id: &str,
        note_id: NoteId,
        draft: &NoteDraft,
    ) -> NoteServiceResult<Note> {
        draft.validate()?;
        self.repo
            .update_note(user_id, note_id, draft)
            .map_err(|err| failed("note_update", err))
    }

    pub fn delete_note(&mut self, user_id: &str, note_id: NoteId) -> NoteServiceResult<()> {
        self.repo
            .delete_note(user_id, note_id)
            .map_err(|err| failed("note_delete", err))
    }

    pub fn clear_note_tags(&mut self, user_id: &str, note_id: NoteId) -> NoteServiceResult<Note> {
        self.repo
            .clear_note_tags(user_id, note_id)
            .and_then(|()| self.repo.find_note(user_id, note_id))
            .map_err(|err| failed("note_clear_tags", err))
    }

    pub fn list_tags(&self) -> NoteServiceResult<Vec<Tag>> {
        self.repo
            .list_tags()
            .map_err(|err| failed("tag_list", err))
    }
}

fn failed(event: &str, err: RepoError) -> NoteServiceError {
    if !err.is_not_found() {
        error!(
            "event={} module=service status=error retryable={} error={}",
            event,
            err.is_retryable(),
            err
        );
    }
    err.into()
}
