//! Messages sent from a running scan to its consumer.

use std::path::PathBuf;
use std::time::Duration;

use bigfile_core::{ResultStore, ScanError, ScanWarning, Snapshot};

use crate::controller::ScanPhase;
use crate::progress::ScanProgress;

/// A notification from the scan worker.
///
/// Progress counts never decrease, and [`ScanEvent::Finished`] is always the
/// last event of a scan.
#[derive(Debug)]
pub enum ScanEvent {
    /// Periodic progress update. May be coalesced when the consumer lags.
    Progress(ScanProgress),
    /// Approximately sorted view of everything found so far, published after
    /// each resort when enabled in the config.
    Partial(Snapshot),
    /// The scan reached a terminal state.
    Finished(ScanReport),
}

/// How a scan ended.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The walk ran to the end.
    Completed,
    /// A stop was requested before the walk finished.
    Cancelled,
    /// The root could not be traversed, or the worker died.
    Failed(ScanError),
}

impl ScanOutcome {
    /// The phase the controller settles in for this outcome.
    pub fn phase(&self) -> ScanPhase {
        match self {
            Self::Completed => ScanPhase::Completed,
            Self::Cancelled | Self::Failed(_) => ScanPhase::Cancelled,
        }
    }
}

/// Final result of a scan, handed to the consumer with ownership of the store.
#[derive(Debug)]
pub struct ScanReport {
    /// Root that was requested.
    pub root: PathBuf,
    /// How the scan ended.
    pub outcome: ScanOutcome,
    /// Finalized, fully sorted records. Partial when cancelled.
    pub store: ResultStore,
    /// Number of records appended during the scan.
    pub records_found: u64,
    /// Sum of all record sizes.
    pub total_size: u64,
    /// Entries skipped during the walk.
    pub warnings: Vec<ScanWarning>,
    /// Wall time of the scan.
    pub elapsed: Duration,
}

impl ScanReport {
    pub(crate) fn failed(root: PathBuf, error: ScanError) -> Self {
        Self {
            root,
            outcome: ScanOutcome::Failed(error),
            store: ResultStore::new(),
            records_found: 0,
            total_size: 0,
            warnings: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Check if the walk ran to the end.
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, ScanOutcome::Completed)
    }

    /// The fatal error, if the scan failed.
    pub fn error(&self) -> Option<&ScanError> {
        match &self.outcome {
            ScanOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Sorted view of the results.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }
}
