//! Choosing which records to delete.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bigfile_core::FileRecord;

/// An ordered set of records picked for deletion. A path is selected at most once.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    records: Vec<FileRecord>,
    paths: HashSet<PathBuf>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Returns `false` if its path was already selected.
    pub fn select(&mut self, record: FileRecord) -> bool {
        if !self.paths.insert(record.path.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Select every record.
    pub fn select_all(&mut self, records: &[FileRecord]) {
        for record in records {
            self.select(record.clone());
        }
    }

    /// Select the first `n` records.
    pub fn select_top(&mut self, records: &[FileRecord], n: usize) {
        for record in records.iter().take(n) {
            self.select(record.clone());
        }
    }

    /// Select every record at least `min_size` bytes large.
    pub fn select_min_size(&mut self, records: &[FileRecord], min_size: u64) {
        for record in records.iter().filter(|r| r.size >= min_size) {
            self.select(record.clone());
        }
    }

    /// Drop a path from the selection.
    pub fn deselect(&mut self, path: &Path) -> bool {
        if !self.paths.remove(path) {
            return false;
        }
        self.records.retain(|r| r.path != path);
        true
    }

    /// Check if a path is selected.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.records.clear();
        self.paths.clear();
    }

    /// Selected records, in selection order.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Consume the selection.
    pub fn into_records(self) -> Vec<FileRecord> {
        self.records
    }

    /// Number of selected records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of the selected sizes.
    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    /// One-line description, or an empty string when nothing is selected.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!(
            "Selected: {} file(s), Total: {}",
            self.len(),
            humansize::format_size(self.total_size(), humansize::BINARY)
        )
    }

    /// Question to put to the user before deleting the selection.
    pub fn confirmation_message(&self) -> String {
        format!(
            "Are you sure you want to delete {} file(s)?\n\nTotal size: {}\n\nThis action cannot be undone!",
            self.len(),
            humansize::format_size(self.total_size(), humansize::BINARY)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<FileRecord> {
        vec![
            FileRecord::new("/a", 4096),
            FileRecord::new("/b", 1024),
            FileRecord::new("/c", 10),
        ]
    }

    #[test]
    fn test_select_deduplicates_paths() {
        let mut selection = Selection::new();
        assert!(selection.select(FileRecord::new("/a", 1)));
        assert!(!selection.select(FileRecord::new("/a", 1)));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut selection = Selection::new();
        selection.select_all(&records());
        assert_eq!(selection.len(), 3);
        assert_eq!(selection.total_size(), 5130);

        selection.clear();
        assert!(selection.is_empty());
        assert_eq!(selection.summary(), "");
    }

    #[test]
    fn test_select_top_and_min_size() {
        let mut selection = Selection::new();
        selection.select_top(&records(), 1);
        selection.select_min_size(&records(), 1000);

        let paths: Vec<_> = selection.records().iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_deselect() {
        let mut selection = Selection::new();
        selection.select_all(&records());
        assert!(selection.deselect(Path::new("/b")));
        assert!(!selection.deselect(Path::new("/b")));
        assert!(!selection.contains(Path::new("/b")));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_messages() {
        let mut selection = Selection::new();
        selection.select_top(&records(), 2);

        assert_eq!(selection.summary(), "Selected: 2 file(s), Total: 5 KiB");
        let message = selection.confirmation_message();
        assert!(message.starts_with("Are you sure you want to delete 2 file(s)?"));
        assert!(message.ends_with("This action cannot be undone!"));
    }
}
