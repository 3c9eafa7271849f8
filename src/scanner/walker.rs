//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Scanner`] that performs the single depth-first
//! traversal of a directory tree and groups the accepted files by size.
//!
//! # Features
//!
//! - Deterministic traversal (entries sorted by file name)
//! - Subtree pruning for excluded directory names
//! - Inclusive minimum size filter
//! - `(device, inode)` capture for hardlink detection
//! - Graceful shutdown via atomic flag
//!
//! Symlinks are never followed and never reported as files.
//!
//! # Example
//!
//! ```no_run
//! use dupedetector::scanner::{Scanner, ScannerConfig};
//! use std::path::Path;
//!
//! let config = ScannerConfig::new(1024, [".git"]);
//! let (by_size, stats) = Scanner::new(config).scan(Path::new("/home/user")).unwrap();
//! println!("{} files, {} pruned directories", stats.files_accepted, stats.pruned_dirs);
//! ```

use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use super::hardlink::raw_identity;
use super::{FileRecord, ScanError, ScannerConfig};
use crate::duplicates::SizeGroup;

/// Counters collected during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Regular files that passed every filter
    pub files_accepted: usize,
    /// Regular files below the minimum size
    pub filtered_by_size: usize,
    /// Entries skipped because of errors
    pub skipped_entries: usize,
    /// Directories pruned by name
    pub pruned_dirs: usize,
}

/// Single-pass directory scanner.
#[derive(Debug)]
pub struct Scanner {
    /// Scanner configuration
    config: ScannerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Scanner {
    /// Create a new scanner.
    #[must_use]
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walk stops at the next entry and
    /// returns what was collected so far.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Whether an entry should be pruned together with its subtree.
    fn is_pruned(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.config.is_excluded(name))
    }

    /// Walk `root` and group every accepted file by its size.
    ///
    /// The returned map contains every size seen, including sizes with a
    /// single file; narrowing to candidates is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] only when the root itself cannot be read.
    /// Errors below the root are logged, counted and skipped.
    pub fn scan(&self, root: &Path) -> Result<(HashMap<u64, SizeGroup>, ScanStats), ScanError> {
        let mut groups: HashMap<u64, SizeGroup> = HashMap::new();
        let mut stats = ScanStats::default();
        let pruned = Cell::new(0usize);

        let walk = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if self.is_pruned(entry) {
                    log::debug!("Pruning excluded directory: {}", entry.path().display());
                    pruned.set(pruned.get() + 1);
                    false
                } else {
                    true
                }
            });

        for entry in walk {
            if self.is_shutdown_requested() {
                log::debug!("Scanner: Shutdown requested, stopping walk");
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    let io = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                    return Err(ScanError::from_io(path, io));
                }
                Err(e) => {
                    stats.skipped_entries += 1;
                    log_walk_error(&e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                if entry.file_type().is_symlink() {
                    log::trace!("Skipping symlink: {}", entry.path().display());
                }
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    stats.skipped_entries += 1;
                    log_walk_error(&e);
                    continue;
                }
            };

            let size = metadata.len();
            if size < self.config.min_size {
                stats.filtered_by_size += 1;
                log::trace!(
                    "Skipping file due to size filter ({}): {}",
                    size,
                    entry.path().display()
                );
                continue;
            }

            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            let (device_id, inode) = raw_identity(&metadata);
            let record =
                FileRecord::new(entry.into_path(), size, modified).with_identity(device_id, inode);

            stats.files_accepted += 1;
            groups
                .entry(size)
                .or_insert_with(|| SizeGroup::new(size))
                .add(record);
        }

        stats.pruned_dirs = pruned.get();
        log::info!(
            "Scan complete: {} files accepted, {} below minimum size, {} skipped, {} directories pruned",
            stats.files_accepted,
            stats.filtered_by_size,
            stats.skipped_entries,
            stats.pruned_dirs
        );

        Ok((groups, stats))
    }
}

/// Log a per-entry walk error at a level matching its severity.
fn log_walk_error(error: &walkdir::Error) {
    let path = error
        .path()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());

    match error.io_error().map(std::io::Error::kind) {
        Some(std::io::ErrorKind::PermissionDenied) => {
            log::warn!("Permission denied: {}", path);
        }
        Some(std::io::ErrorKind::NotFound) => {
            log::debug!("File not found (may have been deleted): {}", path);
        }
        _ => {
            log::warn!("Walker error for {}: {}", path, error);
        }
    }
}
