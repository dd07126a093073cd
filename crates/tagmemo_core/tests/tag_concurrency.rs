use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;
use tagmemo_core::db::open_db;
use tagmemo_core::{NoteDraft, NoteRepository, Pagination, SqliteNoteRepository};

const WRITERS: usize = 4;
const NOTES_PER_WRITER: usize = 10;

fn shared_draft(writer: usize, idx: usize) -> NoteDraft {
    NoteDraft::new(
        format!("writer {writer} note {idx}"),
        "body",
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
    .with_tags(["foo".to_string(), format!("writer-{writer}")])
}

#[test]
fn concurrent_writers_introducing_same_tag_create_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("race.db");
    // Migrate once up front so writers only race on tag creation.
    drop(open_db(&path).unwrap());

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut conn = open_db(&path).unwrap();
                let mut repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
                barrier.wait();
                for idx in 0..NOTES_PER_WRITER {
                    repo.save_note(&format!("user-{writer}"), &shared_draft(writer, idx))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut conn = open_db(&path).unwrap();
    let foo_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM tags WHERE name = 'foo';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(foo_rows, 1);

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    assert_eq!(repo.list_tags().unwrap().len(), WRITERS + 1);
    for writer in 0..WRITERS {
        let page = repo
            .list_notes_by_tag(&format!("user-{writer}"), "foo", Pagination::default())
            .unwrap();
        assert_eq!(page.total_count, NOTES_PER_WRITER as u64);
    }
}
