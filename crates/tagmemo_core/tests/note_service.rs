use chrono::NaiveDate;
use tagmemo_core::db::open_db_in_memory;
use tagmemo_core::{
    NoteDraft, NoteService, NoteServiceError, NoteValidationError, PaginationError,
    SqliteNoteRepository,
};
use uuid::Uuid;

const OWNER: &str = "owner";

fn draft(title: &str, tags: &[&str]) -> NoteDraft {
    NoteDraft::new(title, "content", NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        .with_tags(tags.iter().copied())
}

#[test]
fn create_and_list_with_optional_tag_filter() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let work = service.create_note(OWNER, &draft("work", &["Work"])).unwrap();
    service.create_note(OWNER, &draft("home", &["home"])).unwrap();

    let all = service.list_notes(OWNER, None, 1, 10).unwrap();
    assert_eq!(all.total_count, 2);

    let filtered = service.list_notes(OWNER, Some("Work"), 1, 10).unwrap();
    assert_eq!(filtered.total_count, 1);
    assert_eq!(filtered.items[0].id, work.id);

    let case_mismatch = service.list_notes(OWNER, Some("work"), 1, 10).unwrap();
    assert_eq!(case_mismatch.total_count, 0);
}

#[test]
fn blank_tags_are_rejected_not_normalized() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let err = service
        .create_note(OWNER, &draft("t", &["   "]))
        .unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::InvalidNote(NoteValidationError::BlankTagName(_))
    ));
    assert!(service.list_tags().unwrap().is_empty());
}

#[test]
fn invalid_pagination_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);

    let err = service.list_notes(OWNER, None, 0, 10).unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::InvalidPage(PaginationError::InvalidPage)
    ));
}

#[test]
fn missing_note_maps_to_note_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.get_note(OWNER, missing),
        Err(NoteServiceError::NoteNotFound(id)) if id == missing.to_string()
    ));
    assert!(matches!(
        service.delete_note(OWNER, missing),
        Err(NoteServiceError::NoteNotFound(_))
    ));
}

#[test]
fn clear_tags_returns_untagged_note() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let note = service.create_note(OWNER, &draft("t", &["a", "b"])).unwrap();

    let cleared = service.clear_note_tags(OWNER, note.id).unwrap();

    assert!(cleared.tags.is_empty());
    assert!(cleared.updated_at >= note.updated_at);
    assert!(service.list_tags().unwrap().is_empty());
}

#[test]
fn update_then_get_reflects_replacement() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let note = service.create_note(OWNER, &draft("t", &["a"])).unwrap();

    let updated = service
        .update_note(OWNER, note.id, &draft("renamed", &["b"]))
        .unwrap();
    let fetched = service.get_note(OWNER, note.id).unwrap();

    assert_eq!(fetched, updated);
    let names: Vec<String> = service
        .list_tags()
        .unwrap()
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    assert_eq!(names, vec!["b".to_string()]);
}
