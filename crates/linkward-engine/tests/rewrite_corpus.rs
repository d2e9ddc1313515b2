//! End-to-end rewrite scenarios against a notes directory on disk.

use linkward_engine::{DocumentStore, NotesDir, PathChange, Rewriter};
use pretty_assertions::assert_eq;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_file(notes_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = notes_dir.path().join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}

fn read_file(notes_dir: &TempDir, filename: &str) -> String {
    fs::read_to_string(notes_dir.path().join(filename)).unwrap()
}

#[test]
fn moving_a_note_updates_the_whole_corpus() {
    // Given a corpus where two notes reference b.md and one does not
    let notes_dir = tempfile::tempdir().unwrap();
    create_file(
        &notes_dir,
        "notes/a.md",
        "See [Old Note](b.md) for context.\n",
    );
    create_file(&notes_dir, "notes/b.md", "# The note being moved\n");
    create_file(
        &notes_dir,
        "index.md",
        "Start at [the note](notes/b.md).\n",
    );
    create_file(&notes_dir, "unrelated.md", "No links here.\n");

    let store = NotesDir::open(notes_dir.path()).unwrap();
    let rewriter = Rewriter::new(&store);
    let changes = [PathChange::new("notes/b.md", "archive/b.md")];

    // When the change is applied document by document, as the CLI does
    let mut updated = 0;
    for doc in store.list_documents().unwrap() {
        if rewriter.apply_path_changes(&doc, &changes, false).unwrap() {
            updated += 1;
        }
    }

    // Then only the referencing documents were rewritten
    assert_eq!(updated, 2);
    assert_eq!(
        read_file(&notes_dir, "notes/a.md"),
        "See [Old Note](../archive/b.md) for context.\n"
    );
    assert_eq!(
        read_file(&notes_dir, "index.md"),
        "Start at [the note](archive/b.md).\n"
    );
    assert_eq!(read_file(&notes_dir, "unrelated.md"), "No links here.\n");
}

#[test]
fn rename_titles_follows_the_new_file_name() {
    let notes_dir = tempfile::tempdir().unwrap();
    create_file(&notes_dir, "a.md", "Read [My Note](drafts/note.md) first.\n");

    let store = NotesDir::open(notes_dir.path()).unwrap();
    let rewriter = Rewriter::new(&store);

    rewriter
        .apply_path_change(
            RelativePath::new("a.md"),
            RelativePath::new("drafts/note.md"),
            RelativePath::new("published/final.md"),
            true,
        )
        .unwrap();

    assert_eq!(
        read_file(&notes_dir, "a.md"),
        "Read [final](published/final.md) first.\n"
    );
}

#[test]
fn reverse_lookup_reflects_rewrites_immediately() {
    let notes_dir = tempfile::tempdir().unwrap();
    create_file(&notes_dir, "a.md", "points at [c](notes/c.md)");
    create_file(&notes_dir, "b.md", "no links");

    let store = NotesDir::open(notes_dir.path()).unwrap();
    let rewriter = Rewriter::new(&store);

    let before = rewriter
        .find_documents_linking_to(RelativePath::new("notes/c.md"))
        .unwrap();
    assert_eq!(before, vec![RelativePathBuf::from("a.md")]);

    let changes = [PathChange::new("notes/c.md", "archive/c.md")];
    for doc in store.list_documents().unwrap() {
        rewriter.apply_path_changes(&doc, &changes, false).unwrap();
    }

    let after_old = rewriter
        .find_documents_linking_to(RelativePath::new("notes/c.md"))
        .unwrap();
    assert_eq!(after_old, Vec::<RelativePathBuf>::new());

    let after_new = rewriter
        .find_documents_linking_to(RelativePath::new("archive/c.md"))
        .unwrap();
    assert_eq!(after_new, vec![RelativePathBuf::from("a.md")]);
}

#[test]
fn untouched_documents_stay_byte_identical() {
    let notes_dir = tempfile::tempdir().unwrap();
    let original = "odd spacing  [x]( y.md )\ttrailing\nand \\[escaped\\](kept.md)\n";
    create_file(&notes_dir, "quirky.md", original);

    let store = NotesDir::open(notes_dir.path()).unwrap();
    let rewriter = Rewriter::new(&store);
    let changes = [PathChange::new("missing.md", "elsewhere/missing.md")];

    let written = rewriter
        .apply_path_changes(RelativePath::new("quirky.md"), &changes, false)
        .unwrap();

    assert!(!written);
    assert_eq!(read_file(&notes_dir, "quirky.md"), original);
}
