//! JWalk-based file discovery.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use jwalk::{DirEntry, DirEntryIter, Parallelism, WalkDir};
use tracing::debug;

use bigfile_core::{FileRecord, ScanConfig, ScanError, ScanWarning};

/// Lazy stream of discovered files, or entries that had to be skipped.
pub type RecordStream = Box<dyn Iterator<Item = Result<FileRecord, ScanWarning>>>;

/// Something that can enumerate the files under a root.
///
/// Each call starts a fresh traversal. The returned stream is consumed on the
/// thread that called `walk` and does nothing once the consumer stops pulling.
pub trait RecordSource: Send + Sync {
    /// Start walking `root`.
    ///
    /// Fails only when the root itself cannot be traversed.
    fn walk(&self, root: &Path, config: &ScanConfig) -> Result<RecordStream, ScanError>;
}

/// Parallel directory walker backed by jwalk.
#[derive(Debug, Default, Clone, Copy)]
pub struct JwalkWalker;

impl JwalkWalker {
    /// Create a new walker.
    pub fn new() -> Self {
        Self
    }

    /// Validate `root` and start a traversal of it.
    pub fn walk(&self, root: &Path, config: &ScanConfig) -> Result<Walk, ScanError> {
        let root_path = root.canonicalize().map_err(|e| ScanError::io(root, e))?;

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        // jwalk reports an unreadable root as an ordinary entry error, so check it here.
        std::fs::read_dir(&root_path).map_err(|e| ScanError::io(&root_path, e))?;

        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let mut walker = WalkDir::new(&root_path)
            .parallelism(parallelism)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .min_depth(0)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX));

        let matcher = config.ignore_matcher()?;
        if !matcher.is_empty() {
            let matcher = Arc::new(matcher);
            walker = walker.process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|child| match child {
                    Ok(entry) => !matcher.is_match(entry.file_name()),
                    Err(_) => true,
                });
            });
        }

        debug!(root = %root_path.display(), "walk started");

        Ok(Walk {
            root: root_path,
            entries: walker.into_iter(),
        })
    }
}

impl RecordSource for JwalkWalker {
    fn walk(&self, root: &Path, config: &ScanConfig) -> Result<RecordStream, ScanError> {
        Ok(Box::new(JwalkWalker::walk(self, root, config)?))
    }
}

/// An in-progress traversal started by [`JwalkWalker::walk`].
pub struct Walk {
    root: PathBuf,
    entries: DirEntryIter<((), ())>,
}

impl Walk {
    /// Canonical root of this traversal.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for Walk {
    type Item = Result<FileRecord, ScanWarning>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(warning_from_walk_error(&err))),
            };

            if let Some(item) = stat_entry(&entry) {
                return Some(item);
            }
        }
    }
}

/// Stat a single entry. Directories and special files yield `None`.
fn stat_entry(entry: &DirEntry<((), ())>) -> Option<Result<FileRecord, ScanWarning>> {
    let file_type = entry.file_type();
    if !file_type.is_file() && !file_type.is_symlink() {
        return None;
    }

    let path = entry.path();

    // Follows symlinks, so a link to a file is recorded with the target's size.
    match std::fs::metadata(&path) {
        Ok(metadata) if metadata.is_file() => Some(Ok(FileRecord::new(path, metadata.len()))),
        Ok(_) => None,
        Err(err) if file_type.is_symlink() && err.kind() == std::io::ErrorKind::NotFound => {
            Some(Err(ScanWarning::broken_symlink(path)))
        }
        Err(err) => Some(Err(ScanWarning::metadata_error(path, &err))),
    }
}

fn warning_from_walk_error(err: &jwalk::Error) -> ScanWarning {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    match err.io_error().map(std::io::Error::kind) {
        Some(std::io::ErrorKind::PermissionDenied) => ScanWarning::permission_denied(path),
        _ => ScanWarning::read_error(path, err),
    }
}
