//! Single-scan orchestration: walker, result store and cancellation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bigfile_core::{ResultStore, ScanConfig, ScanError, ScanWarning};

use crate::SCAN_CHANNEL_SIZE;
use crate::event::{ScanEvent, ScanOutcome, ScanReport};
use crate::progress::ProgressTracker;
use crate::walker::{JwalkWalker, RecordSource, RecordStream};

/// Lifecycle of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPhase {
    /// No scan has run, or the last one was acknowledged.
    #[default]
    Idle,
    /// A scan worker is active.
    Running,
    /// The last scan walked the whole tree.
    Completed,
    /// The last scan was stopped early or failed.
    Cancelled,
}

impl ScanPhase {
    /// Check if this is `Completed` or `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// State of the scan currently owned by the controller.
#[derive(Debug)]
pub struct ScanSession {
    root: PathBuf,
    started_at: Instant,
    cancel: CancellationToken,
    records_found: Arc<AtomicU64>,
}

impl ScanSession {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            started_at: Instant::now(),
            cancel: CancellationToken::new(),
            records_found: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Root being scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Records appended so far.
    pub fn records_found(&self) -> u64 {
        self.records_found.load(Ordering::Relaxed)
    }

    /// Check if a stop was requested.
    pub fn cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Time since the scan started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Runs at most one scan at a time and reports it over a channel.
///
/// The scan itself runs on a blocking worker that owns the [`ResultStore`]
/// until the scan ends; the store is then handed over inside
/// [`ScanEvent::Finished`]. Callers never touch the store while a scan runs.
pub struct ScanController {
    config: ScanConfig,
    source: Arc<dyn RecordSource>,
    phase: Arc<watch::Sender<ScanPhase>>,
    session: Option<ScanSession>,
}

impl ScanController {
    /// Create a controller that walks the filesystem with jwalk.
    pub fn new(config: ScanConfig) -> Self {
        Self::with_source(config, Arc::new(JwalkWalker::new()))
    }

    /// Create a controller that pulls records from a custom source.
    pub fn with_source(config: ScanConfig, source: Arc<dyn RecordSource>) -> Self {
        let (phase, _) = watch::channel(ScanPhase::Idle);
        Self {
            config,
            source,
            phase: Arc::new(phase),
            session: None,
        }
    }

    /// The configuration used for new scans.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> ScanPhase {
        *self.phase.borrow()
    }

    /// Watch phase transitions.
    pub fn subscribe_phase(&self) -> watch::Receiver<ScanPhase> {
        self.phase.subscribe()
    }

    /// Check if a scan worker is active.
    pub fn is_running(&self) -> bool {
        self.phase() == ScanPhase::Running
    }

    /// The active or most recent unacknowledged session.
    pub fn session(&self) -> Option<&ScanSession> {
        self.session.as_ref()
    }

    /// Start scanning `root` in the background.
    ///
    /// Must be called from within a tokio runtime. Fails without touching the
    /// running scan if one is already active. A terminal phase left by a
    /// previous scan is acknowledged implicitly.
    ///
    /// If the worker panics, the scan ends as [`ScanOutcome::Failed`] with an
    /// empty store; records collected before the panic are lost.
    pub fn start(&mut self, root: impl Into<PathBuf>) -> Result<mpsc::Receiver<ScanEvent>, ScanError> {
        if self.is_running() {
            let root = self
                .session
                .as_ref()
                .map(|s| s.root.clone())
                .unwrap_or_default();
            return Err(ScanError::AlreadyRunning { root });
        }
        self.acknowledge();

        let root = root.into();
        let session = ScanSession::new(root.clone());
        let (tx, rx) = mpsc::channel(SCAN_CHANNEL_SIZE);

        let worker = ScanWorker {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
            root: root.clone(),
            cancel: session.cancel.clone(),
            records_found: Arc::clone(&session.records_found),
            phase: Arc::clone(&self.phase),
            tx: tx.clone(),
        };

        self.session = Some(session);
        self.phase.send_replace(ScanPhase::Running);
        info!(root = %root.display(), "scan started");

        let phase = Arc::clone(&self.phase);
        tokio::spawn(async move {
            // Walking and sorting block, so keep them off the async workers.
            let result = tokio::task::spawn_blocking(move || worker.run()).await;

            if let Err(e) = result {
                warn!(root = %root.display(), error = %e, "scan worker failed");
                phase.send_replace(ScanPhase::Cancelled);
                let error = ScanError::Other {
                    message: format!("Scan worker failed: {e}"),
                };
                let _ = tx.send(ScanEvent::Finished(ScanReport::failed(root, error))).await;
            }
        });

        Ok(rx)
    }

    /// Ask the running scan to stop. Does nothing when no scan is running.
    ///
    /// The worker notices before pulling its next entry, finalizes what it
    /// has, and reports [`ScanOutcome::Cancelled`].
    pub fn stop(&self) {
        if !self.is_running() {
            return;
        }
        if let Some(session) = &self.session {
            debug!(root = %session.root.display(), "stop requested");
            session.cancel.cancel();
        }
    }

    /// Return from a terminal phase to `Idle`, dropping the finished session.
    pub fn acknowledge(&mut self) {
        if self.phase().is_terminal() {
            self.phase.send_replace(ScanPhase::Idle);
            self.session = None;
        }
    }
}

/// Everything the blocking worker needs for one scan.
struct ScanWorker {
    source: Arc<dyn RecordSource>,
    config: ScanConfig,
    root: PathBuf,
    cancel: CancellationToken,
    records_found: Arc<AtomicU64>,
    phase: Arc<watch::Sender<ScanPhase>>,
    tx: mpsc::Sender<ScanEvent>,
}

impl ScanWorker {
    fn run(self) {
        let mut tracker = ProgressTracker::new();
        let mut store = ResultStore::with_threshold(self.config.resort_threshold);
        let mut warnings = Vec::new();

        let fatal = match self.source.walk(&self.root, &self.config) {
            Ok(entries) => {
                self.consume(entries, &mut store, &mut tracker, &mut warnings);
                None
            }
            Err(err) => {
                warn!(root = %self.root.display(), error = %err, "scan failed");
                Some(err)
            }
        };

        // Partial results are shown fully sorted too.
        store.finalize();

        let outcome = match fatal {
            Some(err) => ScanOutcome::Failed(err),
            None if self.cancel.is_cancelled() => ScanOutcome::Cancelled,
            None => ScanOutcome::Completed,
        };

        info!(
            root = %self.root.display(),
            records = tracker.records_found(),
            skipped = warnings.len(),
            outcome = ?outcome,
            "scan finished"
        );

        self.phase.send_replace(outcome.phase());

        let report = ScanReport {
            root: self.root.clone(),
            outcome,
            records_found: tracker.records_found(),
            total_size: store.total_size(),
            store,
            warnings,
            elapsed: tracker.elapsed(),
        };
        let _ = self.tx.blocking_send(ScanEvent::Finished(report));
    }

    fn consume(
        &self,
        mut entries: RecordStream,
        store: &mut ResultStore,
        tracker: &mut ProgressTracker,
        warnings: &mut Vec<ScanWarning>,
    ) {
        let interval = self.config.progress_interval.max(1) as u64;

        loop {
            if self.cancel.is_cancelled() {
                debug!(records = tracker.records_found(), "cancellation observed");
                break;
            }

            let Some(item) = entries.next() else {
                break;
            };

            match item {
                Ok(record) => {
                    tracker.record_file(&record);
                    self.records_found
                        .store(tracker.records_found(), Ordering::Relaxed);
                    store.append(record);

                    if store.resort_if_due() && self.config.publish_partial {
                        self.publish(ScanEvent::Partial(store.snapshot()));
                    }
                    if tracker.records_found() % interval == 0 {
                        self.publish(ScanEvent::Progress(tracker.snapshot()));
                    }
                }
                Err(warning) => {
                    debug!(path = %warning.path.display(), "skipped: {}", warning.message);
                    tracker.record_skip();
                    warnings.push(warning);
                }
            }
        }
    }

    /// Non-blocking send. A full channel drops the event; a closed one means
    /// nobody is listening anymore, so the scan stops.
    fn publish(&self, event: ScanEvent) {
        match self.tx.try_send(event) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Closed(_)) => self.cancel.cancel(),
        }
    }
}
