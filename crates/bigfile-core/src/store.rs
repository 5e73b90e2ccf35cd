//! Size-ordered collection of discovered files.

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use rayon::slice::ParallelSliceMut;

use crate::record::FileRecord;

/// Number of appends between two resorts when no threshold is configured.
pub const DEFAULT_RESORT_THRESHOLD: usize = 100;

/// Collections at least this large are sorted on the rayon pool.
const PARALLEL_SORT_MIN_LEN: usize = 50_000;

/// Append-and-periodically-resort collection of file records.
///
/// Records are kept sorted by size, largest first, but only up to the last
/// resort: between resorts new records are appended to an unsorted tail.
/// Sorting after every insertion is too expensive for large trees, so a full
/// sort happens once `threshold` records have been appended since the last
/// one. [`ResultStore::finalize`] always sorts, and must be called before the
/// contents are shown as final results.
#[derive(Debug, Clone)]
pub struct ResultStore {
    records: Vec<FileRecord>,
    dirty: usize,
    threshold: usize,
}

impl ResultStore {
    /// Create an empty store with the default resort threshold.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_RESORT_THRESHOLD)
    }

    /// Create an empty store that resorts every `threshold` appends.
    ///
    /// A threshold of zero is treated as one.
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            records: Vec::new(),
            dirty: 0,
            threshold: threshold.max(1),
        }
    }

    /// Appends since the last sort.
    pub fn dirty_count(&self) -> usize {
        self.dirty
    }

    /// The configured resort threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Append a record to the unsorted tail.
    pub fn append(&mut self, record: FileRecord) {
        self.records.push(record);
        self.dirty += 1;
    }

    /// Sort the whole collection if enough records were appended since the
    /// last sort. Returns `true` when a sort happened.
    pub fn resort_if_due(&mut self) -> bool {
        if self.dirty < self.threshold {
            return false;
        }
        self.sort();
        true
    }

    /// Sort unconditionally. After this call the store is fully ordered.
    pub fn finalize(&mut self) {
        self.sort();
    }

    fn sort(&mut self) {
        if self.records.len() >= PARALLEL_SORT_MIN_LEN {
            self.records.par_sort_by(|a, b| b.size.cmp(&a.size));
        } else {
            self.records.sort_by(|a, b| b.size.cmp(&a.size));
        }
        self.dirty = 0;
    }

    /// Remove the first record equal to `record` (same size and path).
    ///
    /// Returns the removed record, or `None` if nothing matched.
    pub fn remove_exact(&mut self, record: &FileRecord) -> Option<FileRecord> {
        let index = self.records.iter().position(|r| r == record)?;
        Some(self.records.remove(index))
    }

    /// Remove the first record with the given path, whatever its size.
    pub fn remove_path(&mut self, path: &Path) -> Option<FileRecord> {
        let index = self.records.iter().position(|r| r.path == path)?;
        Some(self.records.remove(index))
    }

    /// Take an immutable copy of the current ordering.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            records: Arc::from(self.records.as_slice()),
        }
    }

    /// Iterate over records in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all record sizes.
    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    /// Check if records are currently ordered largest first.
    pub fn is_sorted(&self) -> bool {
        self.records.windows(2).all(|w| w[0].size >= w[1].size)
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.records.clear();
        self.dirty = 0;
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a ResultStore {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Immutable view of a [`ResultStore`] at a point in time.
///
/// Cloning a snapshot is cheap; all clones share the same records.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Arc<[FileRecord]>,
}

impl Snapshot {
    /// Records in snapshot order.
    pub fn as_slice(&self) -> &[FileRecord] {
        &self.records
    }

    /// Sum of all record sizes.
    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    /// The first `n` records.
    pub fn top(&self, n: usize) -> &[FileRecord] {
        &self.records[..n.min(self.records.len())]
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            records: Arc::from(Vec::new()),
        }
    }
}

impl Deref for Snapshot {
    type Target = [FileRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
