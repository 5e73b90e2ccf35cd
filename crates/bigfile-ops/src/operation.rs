//! Per-file deletion errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A file that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}: {message}", path.display())]
pub struct DeletionError {
    /// The path that could not be removed.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl DeletionError {
    /// Create a new deletion error.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Describe a failed removal.
    pub fn from_io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let message = match error.kind() {
            std::io::ErrorKind::NotFound => "File not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
            _ => error.to_string(),
        };
        Self::new(path, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = DeletionError::new("/tmp/a.bin", "Permission denied");
        assert_eq!(err.to_string(), "/tmp/a.bin: Permission denied");
    }

    #[test]
    fn test_from_io() {
        let err = DeletionError::from_io("/gone", &std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(err.message, "File not found");
    }
}
