//! Progress and result types for deletion batches.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::DeletionError;

/// Progress of a deletion batch.
#[derive(Debug, Clone, Default)]
pub struct DeletionProgress {
    /// Number of files in the batch.
    pub total: usize,
    /// Files removed so far.
    pub deleted: usize,
    /// Files that could not be removed so far.
    pub failed: usize,
    /// Bytes freed so far.
    pub bytes_freed: u64,
    /// The file about to be removed.
    pub current: Option<PathBuf>,
}

impl DeletionProgress {
    /// Create progress for a batch of `total` files.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Files processed so far, successful or not.
    pub fn processed(&self) -> usize {
        self.deleted + self.failed
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.processed() as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Result of a deletion batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    /// Number of files removed.
    pub deleted: usize,
    /// Sum of the recorded sizes of the removed files.
    pub bytes_freed: u64,
    /// Files that could not be removed, in input order.
    pub failures: Vec<DeletionError>,
}

impl DeletionOutcome {
    /// Number of files that could not be removed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Check if every file in the batch was removed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!(
                "Successfully deleted {} file(s)\nFreed space: {}",
                self.deleted,
                humansize::format_size(self.bytes_freed, humansize::BINARY)
            )
        } else {
            format!(
                "Deleted: {} file(s)\nFailed: {} file(s)",
                self.deleted,
                self.failed()
            )
        }
    }

    /// List the first `limit` failures, one per line, then how many were left out.
    pub fn failure_report(&self, limit: usize) -> String {
        let mut lines: Vec<String> = self
            .failures
            .iter()
            .take(limit)
            .map(ToString::to_string)
            .collect();

        let remaining = self.failures.len().saturating_sub(limit);
        if remaining > 0 {
            lines.push(format!("... and {remaining} more"));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome_with_failures(count: usize) -> DeletionOutcome {
        DeletionOutcome {
            deleted: 2,
            bytes_freed: 2048,
            failures: (0..count)
                .map(|i| DeletionError::new(format!("/f{i}"), "Permission denied"))
                .collect(),
        }
    }

    #[test]
    fn test_success_summary() {
        let outcome = outcome_with_failures(0);
        assert!(outcome.is_success());
        assert_eq!(outcome.summary(), "Successfully deleted 2 file(s)\nFreed space: 2 KiB");
    }

    #[test]
    fn test_failure_summary() {
        let outcome = outcome_with_failures(3);
        assert!(!outcome.is_success());
        assert_eq!(outcome.failed(), 3);
        assert_eq!(outcome.summary(), "Deleted: 2 file(s)\nFailed: 3 file(s)");
    }

    #[test]
    fn test_failure_report_truncates() {
        let outcome = outcome_with_failures(13);
        let report = outcome.failure_report(10);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "/f0: Permission denied");
        assert_eq!(lines[10], "... and 3 more");
    }

    #[test]
    fn test_failure_report_without_overflow() {
        let report = outcome_with_failures(2).failure_report(10);
        assert_eq!(report.lines().count(), 2);
        assert!(!report.contains("more"));
    }

    #[test]
    fn test_progress_percentage() {
        let mut progress = DeletionProgress::new(4);
        assert_eq!(progress.percentage(), 0.0);
        progress.deleted = 1;
        progress.failed = 1;
        assert_eq!(progress.percentage(), 50.0);
        assert_eq!(DeletionProgress::new(0).percentage(), 0.0);
    }
}
