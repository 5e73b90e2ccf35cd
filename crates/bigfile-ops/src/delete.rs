//! Deletion operations.

use std::fs;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use bigfile_core::{FileRecord, ResultStore};

use crate::progress::{DeletionOutcome, DeletionProgress};
use crate::{DELETION_CHANNEL_SIZE, DeletionError};

/// Permanently deletes files and keeps a [`ResultStore`] consistent.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeletionService;

impl DeletionService {
    /// Create a new deletion service.
    pub fn new() -> Self {
        Self
    }

    /// Delete the files behind `records`, in order.
    ///
    /// A failure is recorded and the batch moves on to the next record; the
    /// outcome is returned only after every record was attempted. Each
    /// removed file's record is also removed from `store`.
    pub fn delete(&self, store: &mut ResultStore, records: &[FileRecord]) -> DeletionOutcome {
        self.delete_with_progress(store, records, |_| {})
    }

    /// Like [`DeletionService::delete`], reporting progress before each file
    /// and once more when the batch is done.
    pub fn delete_with_progress<F>(
        &self,
        store: &mut ResultStore,
        records: &[FileRecord],
        mut on_progress: F,
    ) -> DeletionOutcome
    where
        F: FnMut(&DeletionProgress),
    {
        let mut progress = DeletionProgress::new(records.len());
        let mut outcome = DeletionOutcome::default();

        if records.is_empty() {
            return outcome;
        }

        info!(count = records.len(), "deleting files");

        for record in records {
            progress.current = Some(record.path.clone());
            on_progress(&progress);

            match fs::remove_file(&record.path) {
                Ok(()) => {
                    outcome.deleted += 1;
                    outcome.bytes_freed += record.size;
                    progress.deleted += 1;
                    progress.bytes_freed += record.size;

                    // Records match on size and path; a file that changed size
                    // since the scan is gone from disk but stays listed.
                    if store.remove_exact(record).is_none() {
                        warn!(path = %record.path.display(), size = record.size, "deleted file has no matching record");
                    }
                }
                Err(err) => {
                    debug!(path = %record.path.display(), error = %err, "delete failed");
                    outcome.failures.push(DeletionError::from_io(&record.path, &err));
                    progress.failed += 1;
                }
            }
        }

        progress.current = None;
        on_progress(&progress);

        info!(
            deleted = outcome.deleted,
            failed = outcome.failed(),
            bytes_freed = outcome.bytes_freed,
            "deletion finished"
        );

        outcome
    }
}

/// Message from a background deletion batch.
#[derive(Debug)]
pub enum DeletionEvent {
    /// Progress update. May be dropped when the consumer lags.
    Progress(DeletionProgress),
    /// The batch finished; the store is handed back with the deleted records removed.
    Complete {
        outcome: DeletionOutcome,
        store: ResultStore,
    },
}

/// Start background deletion of `records`.
///
/// The store moves to the worker for the duration of the batch and comes back
/// in [`DeletionEvent::Complete`]. Must be called from within a tokio runtime.
pub fn start_deletion(mut store: ResultStore, records: Vec<FileRecord>) -> mpsc::Receiver<DeletionEvent> {
    let (tx, rx) = mpsc::channel(DELETION_CHANNEL_SIZE);

    tokio::spawn(async move {
        let progress_tx = tx.clone();

        // Perform deletion in blocking task to not block the async runtime
        let result = tokio::task::spawn_blocking(move || {
            let outcome = DeletionService::new().delete_with_progress(&mut store, &records, |p| {
                let _ = progress_tx.try_send(DeletionEvent::Progress(p.clone()));
            });
            (outcome, store)
        })
        .await;

        match result {
            Ok((outcome, store)) => {
                let _ = tx.send(DeletionEvent::Complete { outcome, store }).await;
            }
            Err(e) => warn!(error = %e, "deletion worker failed"),
        }
    });

    rx
}
