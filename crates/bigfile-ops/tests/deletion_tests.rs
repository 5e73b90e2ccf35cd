use std::fs;
use std::path::Path;

use tempfile::TempDir;

use bigfile_core::{FileRecord, ResultStore};
use bigfile_ops::{DeletionEvent, DeletionService, Selection, start_deletion};

/// Create files of the given sizes and a finalized store listing them.
fn populate(root: &Path, files: &[(&str, usize)]) -> (ResultStore, Vec<FileRecord>) {
    let mut store = ResultStore::new();
    let mut records = Vec::new();
    for (name, size) in files {
        let path = root.join(name);
        fs::write(&path, vec![b'x'; *size]).unwrap();
        let record = FileRecord::new(path, *size as u64);
        store.append(record.clone());
        records.push(record);
    }
    store.finalize();
    (store, records)
}

#[test]
fn test_delete_all_existing() {
    let temp = TempDir::new().unwrap();
    let (mut store, records) = populate(temp.path(), &[("a", 300), ("b", 20), ("c", 1), ("keep", 5)]);
    let selection = &records[..3];

    let outcome = DeletionService::new().delete(&mut store, selection);

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.deleted, 3);
    assert_eq!(outcome.bytes_freed, 321);
    for record in selection {
        assert!(!record.path.exists());
        assert!(!store.iter().any(|r| r == record));
    }
    assert_eq!(store.len(), 1);
    assert!(temp.path().join("keep").exists());
}

#[test]
fn test_externally_removed_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let (mut store, records) = populate(temp.path(), &[("one", 10), ("two", 20), ("three", 30)]);
    fs::remove_file(temp.path().join("two")).unwrap();

    let outcome = DeletionService::new().delete(&mut store, &records);

    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].path.ends_with("two"));
    assert_eq!(outcome.failures[0].message, "File not found");

    // Only the successful deletions leave the store.
    let remaining: Vec<_> = store.iter().cloned().collect();
    assert_eq!(remaining, vec![records[1].clone()]);
}

#[test]
fn test_failure_does_not_abort_batch() {
    let temp = TempDir::new().unwrap();
    let (mut store, mut records) = populate(temp.path(), &[("first", 1), ("last", 2)]);
    let dir = temp.path().join("a_directory");
    fs::create_dir(&dir).unwrap();
    records.insert(1, FileRecord::new(&dir, 0));

    let outcome = DeletionService::new().delete(&mut store, &records);

    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.failed(), 1);
    assert!(dir.exists());
    assert!(store.is_empty());
}

#[test]
fn test_size_mismatch_leaves_stale_record() {
    let temp = TempDir::new().unwrap();
    let (mut store, records) = populate(temp.path(), &[("grown", 10)]);
    let stale = FileRecord::new(&records[0].path, 99);

    let outcome = DeletionService::new().delete(&mut store, &[stale]);

    assert_eq!(outcome.deleted, 1);
    assert!(!records[0].path.exists());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_progress_callback() {
    let temp = TempDir::new().unwrap();
    let (mut store, records) = populate(temp.path(), &[("x", 1), ("y", 2)]);

    let mut seen = Vec::new();
    DeletionService::new().delete_with_progress(&mut store, &records, |p| seen.push(p.clone()));

    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].processed(), 0);
    assert_eq!(seen[1].deleted, 1);
    assert!(seen[2].current.is_none());
    assert_eq!(seen[2].deleted, 2);
    assert_eq!(seen[2].bytes_freed, 3);
}

#[tokio::test]
async fn test_background_deletion_returns_store() {
    let temp = TempDir::new().unwrap();
    let (store, records) = populate(temp.path(), &[("big", 400), ("mid", 40), ("small", 4)]);

    let mut selection = Selection::new();
    selection.select_min_size(&store.snapshot(), 40);
    assert_eq!(selection.len(), 2);

    let mut rx = start_deletion(store, selection.into_records());
    let mut complete = None;
    while let Some(event) = rx.recv().await {
        if let DeletionEvent::Complete { outcome, store } = event {
            complete = Some((outcome, store));
        }
    }

    let (outcome, store) = complete.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.deleted, 2);
    assert_eq!(store.iter().cloned().collect::<Vec<_>>(), vec![records[2].clone()]);
}

#[tokio::test]
async fn test_background_deletion_of_nothing() {
    let mut store = ResultStore::new();
    store.append(FileRecord::new("/not/touched", 1));

    let mut rx = start_deletion(store, Vec::new());
    match rx.recv().await {
        Some(DeletionEvent::Complete { outcome, store }) => {
            assert_eq!(outcome.deleted, 0);
            assert!(outcome.failures.is_empty());
            assert_eq!(store.len(), 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
