//! File record type.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A discovered file and its size in bytes.
///
/// Records are immutable once created. Two records are equal when both the
/// size and the path match, which is how the result store locates entries
/// for removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Size in bytes at the time the file was discovered.
    pub size: u64,
    /// Path of the file.
    pub path: PathBuf,
}

impl FileRecord {
    /// Create a new record.
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            size,
            path: path.into(),
        }
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in mebibytes, as shown next to the byte count in listings.
    pub fn size_mib(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_uses_size_and_path() {
        let a = FileRecord::new("/data/a.bin", 10);
        assert_eq!(a, FileRecord::new("/data/a.bin", 10));
        assert_ne!(a, FileRecord::new("/data/a.bin", 11));
        assert_ne!(a, FileRecord::new("/data/b.bin", 10));
    }

    #[test]
    fn test_size_mib() {
        let record = FileRecord::new("/data/big.iso", 3 * 1024 * 1024);
        assert!((record.size_mib() - 3.0).abs() < f64::EPSILON);
    }
}
