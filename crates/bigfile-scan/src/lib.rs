//! Streaming directory scanner for bigfile.
//!
//! This crate walks a directory tree with jwalk and feeds every regular file
//! it finds into a [`ResultStore`], keeping the store approximately sorted by
//! size while the walk is still running.
//!
//! # Overview
//!
//! - [`JwalkWalker`] turns a root path into a lazy stream of
//!   `Result<FileRecord, ScanWarning>`. Unreadable entries become warnings;
//!   only an unusable root is fatal.
//! - [`ScanController`] runs one scan at a time on a blocking worker,
//!   honours cooperative cancellation, and reports back over a channel.
//!
//! # Example
//!
//! ```rust,no_run
//! use bigfile_scan::{ScanConfig, ScanController, ScanEvent};
//!
//! # async fn run() -> Result<(), bigfile_scan::ScanError> {
//! let mut controller = ScanController::new(ScanConfig::default());
//! let mut events = controller.start("/path/to/scan")?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ScanEvent::Progress(p) => eprintln!("Scanning... {} files found", p.records_found),
//!         ScanEvent::Partial(_) => {}
//!         ScanEvent::Finished(report) => {
//!             for record in report.snapshot().top(10) {
//!                 println!("{:>12} {}", record.size, record.path.display());
//!             }
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod controller;
mod event;
mod progress;
mod walker;

pub use controller::{ScanController, ScanPhase, ScanSession};
pub use event::{ScanEvent, ScanOutcome, ScanReport};
pub use progress::ScanProgress;
pub use walker::{JwalkWalker, RecordSource, RecordStream, Walk};

// Re-export core types for convenience
pub use bigfile_core::{
    FileRecord, ResultStore, ScanConfig, ScanError, ScanWarning, Snapshot, WarningKind,
};

/// Channel buffer size for scan events.
pub const SCAN_CHANNEL_SIZE: usize = 100;
