//! Deletion engine for bigfile.
//!
//! Deletes the files behind a batch of [`FileRecord`]s, keeps the
//! [`ResultStore`] in step with what is actually gone, and reports per-file
//! failures without aborting the batch. Deletion is permanent: nothing is
//! moved to a trash or recycle bin.
//!
//! [`FileRecord`]: bigfile_core::FileRecord
//! [`ResultStore`]: bigfile_core::ResultStore

mod delete;
mod operation;
mod progress;
mod selection;

pub use delete::{DeletionEvent, DeletionService, start_deletion};
pub use operation::DeletionError;
pub use progress::{DeletionOutcome, DeletionProgress};
pub use selection::Selection;

/// Default channel buffer size for deletion progress updates.
pub const DELETION_CHANNEL_SIZE: usize = 100;

/// Number of failures listed individually in a failure report.
pub const FAILURE_REPORT_LIMIT: usize = 10;
