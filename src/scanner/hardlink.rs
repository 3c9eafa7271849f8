//! Hardlink detection for avoiding false space-savings claims.
//!
//! # Overview
//!
//! Hardlinks are multiple directory entries pointing to the same inode on disk.
//! They share the same content but are NOT separate copies. Removing one frees
//! no space. This module extracts the `(device, inode)` identity of a file and
//! tracks which identities have been seen inside a duplicate group.
//!
//! # Platform Support
//!
//! - **Unix**: Uses `(dev, ino)` from file metadata
//! - **Other**: Identity is reported as `(0, 0)`, which means "unknown", and
//!   files with unknown identity are never treated as hardlinks
//!
//! # Example
//!
//! ```
//! use dupedetector::scanner::hardlink::{FileIdentity, HardlinkTracker};
//!
//! let mut tracker = HardlinkTracker::new();
//! let id = FileIdentity::new(1, 100);
//!
//! assert!(!tracker.is_hardlink(id)); // first occurrence
//! assert!(tracker.is_hardlink(id)); // same inode again
//! ```

use std::collections::HashSet;
use std::fs::Metadata;

/// Platform identity of the data behind a path: `(device, inode)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileIdentity {
    /// Device identifier
    pub device_id: u64,
    /// Inode number
    pub inode: u64,
}

impl FileIdentity {
    /// Build an identity, returning `None` for the "unavailable" pair `(0, 0)`.
    #[must_use]
    pub fn new(device_id: u64, inode: u64) -> Option<Self> {
        if device_id == 0 && inode == 0 {
            None
        } else {
            Some(Self { device_id, inode })
        }
    }
}

/// Extract raw `(device, inode)` from file metadata.
///
/// Returns `(0, 0)` on platforms that don't expose inode information.
#[cfg(unix)]
#[must_use]
pub fn raw_identity(metadata: &Metadata) -> (u64, u64) {
    use std::os::unix::fs::MetadataExt;
    (metadata.dev(), metadata.ino())
}

/// Extract raw `(device, inode)` from file metadata.
///
/// Returns `(0, 0)` on platforms that don't expose inode information.
#[cfg(not(unix))]
#[must_use]
pub fn raw_identity(_metadata: &Metadata) -> (u64, u64) {
    (0, 0)
}

/// Tracks seen identities to detect hardlinks.
///
/// The first occurrence of an identity is recorded; every later occurrence
/// is reported as a hardlink.
///
/// # Thread Safety
///
/// `HardlinkTracker` is NOT thread-safe. It is meant to be used per group by
/// a single thread.
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    /// Set of seen identities
    seen: HashSet<FileIdentity>,
}

impl HardlinkTracker {
    /// Create a new hardlink tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Check if an identity was already seen, recording it if not.
    ///
    /// Returns `false` for an unknown identity (`None`), which is also
    /// never recorded.
    pub fn is_hardlink(&mut self, identity: Option<FileIdentity>) -> bool {
        match identity {
            Some(key) => !self.seen.insert(key),
            None => false,
        }
    }

    /// Record an identity without checking it.
    ///
    /// # Returns
    ///
    /// `true` if the identity was newly recorded.
    pub fn record(&mut self, identity: Option<FileIdentity>) -> bool {
        identity.is_some_and(|key| self.seen.insert(key))
    }

    /// Check if hardlink detection is supported on this platform.
    ///
    /// # Example
    ///
    /// ```
    /// use dupedetector::scanner::hardlink::HardlinkTracker;
    ///
    /// if HardlinkTracker::is_supported() {
    ///     println!("Hardlink detection is available");
    /// }
    /// ```
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}
