//! Scan progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use bigfile_core::FileRecord;

/// Progress information during a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    /// Number of files recorded so far.
    pub records_found: u64,
    /// Total bytes of the files recorded so far.
    pub bytes_found: u64,
    /// Number of entries skipped because they could not be read.
    pub skipped: u64,
    /// Most recently recorded file.
    pub current_path: PathBuf,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate scan rate in files per second.
    pub fn records_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.records_found as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Running totals kept by the scan worker.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    records_found: u64,
    bytes_found: u64,
    skipped: u64,
    current_path: PathBuf,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            records_found: 0,
            bytes_found: 0,
            skipped: 0,
            current_path: PathBuf::new(),
        }
    }

    pub fn record_file(&mut self, record: &FileRecord) {
        self.records_found += 1;
        self.bytes_found += record.size;
        self.current_path.clone_from(&record.path);
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn records_found(&self) -> u64 {
        self.records_found
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            records_found: self.records_found,
            bytes_found: self.bytes_found,
            skipped: self.skipped,
            current_path: self.current_path.clone(),
            elapsed: self.start_time.elapsed(),
        }
    }
}
