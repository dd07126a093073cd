//! Note and tag domain model.
//!
//! # Responsibility
//! - Define the persisted `Note`/`Tag` records returned to callers.
//! - Define the caller-supplied `NoteDraft` payload and its validation.
//!
//! # Invariants
//! - `Note::id` and `Note::user_id` never change after creation.
//! - Tag names are compared by exact, case-sensitive equality. Core never
//!   trims or case-folds them.
//! - A note's tag set has no duplicates by name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier of a note row.
pub type NoteId = Uuid;

/// Stable identifier of a canonical tag row.
pub type TagId = Uuid;

/// Canonical, globally unique tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Epoch milliseconds of first creation.
    pub created_at: i64,
    pub updated_at: i64,
}

/// Persisted note together with its resolved tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Owning principal; every query is scoped by it.
    pub user_id: String,
    pub title: String,
    pub content: String,
    /// Date the note is about, independent of row timestamps.
    pub memo_date: NaiveDate,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed on every mutation.
    pub updated_at: i64,
    /// Attached tags, sorted by name.
    pub tags: Vec<Tag>,
}

impl Note {
    /// Returns attached tag names as an order-independent set.
    pub fn tag_names(&self) -> BTreeSet<&str> {
        self.tags.iter().map(|tag| tag.name.as_str()).collect()
    }
}

/// Caller-supplied note payload used by create and update paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub memo_date: NaiveDate,
    /// Requested tag names. Duplicates collapse into one association.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validation failures for note payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteValidationError {
    #[error("note title must not be blank")]
    BlankTitle,
    #[error("tag name must not be blank: `{0}`")]
    BlankTagName(String),
}

impl NoteDraft {
    /// Creates a draft without tags.
    pub fn new(title: impl Into<String>, content: impl Into<String>, memo_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            memo_date,
            tags: Vec::new(),
        }
    }

    /// Replaces the requested tag names.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Checks payload shape before any write.
    ///
    /// Blank values are rejected rather than normalized; normalization is a
    /// caller decision.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::BlankTitle);
        }
        if let Some(tag) = self.tags.iter().find(|tag| tag.trim().is_empty()) {
            return Err(NoteValidationError::BlankTagName(tag.clone()));
        }
        Ok(())
    }

    /// Returns requested tag names deduplicated by exact equality.
    pub fn tag_set(&self) -> BTreeSet<String> {
        self.tags.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteDraft, NoteValidationError};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn tag_set_keeps_case_distinct_names() {
        let draft = NoteDraft::new("t", "c", date()).with_tags(["Rust", "rust", "rust"]);
        let set = draft.tag_set();
        assert_eq!(set.len(), 2);
        assert!(set.contains("Rust"));
        assert!(set.contains("rust"));
    }

    #[test]
    fn validate_rejects_blank_title_and_tags() {
        let blank_title = NoteDraft::new("  ", "c", date());
        assert_eq!(blank_title.validate(), Err(NoteValidationError::BlankTitle));

        let blank_tag = NoteDraft::new("t", "c", date()).with_tags(["ok", " "]);
        assert_eq!(
            blank_tag.validate(),
            Err(NoteValidationError::BlankTagName(" ".to_string()))
        );
    }

    #[test]
    fn draft_deserializes_without_tags_field() {
        let draft: NoteDraft = serde_json::from_str(
            r#"{"title":"t","content":"c","memo_date":"2024-03-01"}"#,
        )
        .unwrap();
        assert!(draft.tags.is_empty());
        assert_eq!(draft.memo_date, date());
    }
}
