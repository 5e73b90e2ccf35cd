//! Error types for scanning operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that end a scan or prevent one from starting.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A scan was started while another one is still running.
    #[error("A scan of {root} is already running")]
    AlreadyRunning { root: PathBuf },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// The entry vanished between listing and stat.
    NotFound,
    /// Symbolic link target does not exist.
    BrokenSymlink,
    /// Error reading a directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
}

/// An entry the walker had to skip. Never fatal to the scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a permission denied warning.
    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Permission denied: {}", path.display()),
            path,
            kind: WarningKind::PermissionDenied,
        }
    }

    /// Create a broken symlink warning.
    pub fn broken_symlink(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Broken symlink: {}", path.display()),
            path,
            kind: WarningKind::BrokenSymlink,
        }
    }

    /// Classify a failed stat of a single entry.
    pub fn metadata_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            std::io::ErrorKind::NotFound => Self {
                message: format!("Vanished before stat: {}", path.display()),
                path,
                kind: WarningKind::NotFound,
            },
            _ => Self {
                message: format!("Metadata error: {error}"),
                path,
                kind: WarningKind::MetadataError,
            },
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            message: format!("Read error: {error}"),
            kind: WarningKind::ReadError,
        }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
