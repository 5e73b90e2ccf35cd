//! Core types for bigfile.
//!
//! This crate provides the data structures shared by the scanner and the
//! deletion engine: file records, the size-ordered result store and its
//! snapshots, scan configuration, and the error taxonomy.

mod config;
mod error;
mod record;
mod store;

pub use config::{ScanConfig, ScanConfigBuilder, ScanConfigBuilderError};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use record::FileRecord;
pub use store::{DEFAULT_RESORT_THRESHOLD, ResultStore, Snapshot};
