//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Depth-first directory walking with directory-name exclusions
//! - Content hashing with XXH64 (partial first-block and full-content)
//! - Device/inode identity extraction for hardlink detection
//! - Bounded object pools for hashing buffers and hash states
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and size grouping
//! - [`hasher`]: XXH64 file hashing (first block and streaming)
//! - [`hardlink`]: `(device, inode)` identity and hardlink tracking
//! - [`pool`]: Thread-safe bounded object pool
//!
//! # Example
//!
//! ```no_run
//! use dupedetector::scanner::{Scanner, ScannerConfig};
//! use std::path::Path;
//!
//! let config = ScannerConfig::new(1024, [".git", "node_modules"]);
//! let (by_size, stats) = Scanner::new(config).scan(Path::new(".")).unwrap();
//!
//! println!("{} files in {} size groups", stats.files_accepted, by_size.len());
//! ```

pub mod hardlink;
pub mod hasher;
pub mod pool;
pub mod walker;

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::SystemTime;

// Re-export main types
pub use hardlink::{FileIdentity, HardlinkTracker};
pub use hasher::{hash_to_hex, FileStats, Hasher, BLOCK_SIZE, PREHASH_SIZE};
pub use walker::{ScanStats, Scanner};

/// Metadata for one physical file discovered during the scan.
///
/// Records are created once by the scanner and then moved through every
/// pipeline stage. Only the content hash is filled in later, and only once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path to the file as produced by the walk
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Device identifier (`0` when the platform does not expose one)
    pub device_id: u64,
    /// Inode number (`0` when the platform does not expose one)
    pub inode: u64,
    /// Full content hash, set once the file has been fully hashed
    content_hash: Option<u64>,
}

impl FileRecord {
    /// Create a new record without device/inode information.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
            device_id: 0,
            inode: 0,
            content_hash: None,
        }
    }

    /// Attach a `(device, inode)` identity to the record.
    #[must_use]
    pub fn with_identity(mut self, device_id: u64, inode: u64) -> Self {
        self.device_id = device_id;
        self.inode = inode;
        self
    }

    /// The hardlink identity of this file, if the platform provided one.
    #[must_use]
    pub fn identity(&self) -> Option<FileIdentity> {
        FileIdentity::new(self.device_id, self.inode)
    }

    /// The full content hash, if computed.
    #[must_use]
    pub fn content_hash(&self) -> Option<u64> {
        self.content_hash
    }

    /// Record the full content hash.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if a hash was already recorded.
    pub fn set_content_hash(&mut self, hash: u64) {
        debug_assert!(
            self.content_hash.is_none(),
            "content hash already set for {}",
            self.path.display()
        );
        self.content_hash = Some(hash);
    }

    /// Byte length of the path as seen by the OS.
    ///
    /// This is the metric used by the path-length keep strategies.
    #[must_use]
    pub fn path_len(&self) -> usize {
        self.path.as_os_str().len()
    }
}

/// Configuration for the scanner.
///
/// Controls the minimum size filter and which directory names are pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Minimum file size to include (in bytes, inclusive).
    /// Files smaller than this are skipped.
    pub min_size: u64,

    /// Directory base names to prune anywhere below the root.
    pub excluded_dirs: HashSet<String>,
}

impl ScannerConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `min_size` - Inclusive minimum file size in bytes
    /// * `excluded_dirs` - Directory names to skip, together with their subtrees
    #[must_use]
    pub fn new<I, S>(min_size: u64, excluded_dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            min_size,
            excluded_dirs: excluded_dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a directory name is excluded.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_dirs.contains(name)
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
