//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides the group types that flow through the pipeline:
//!
//! - [`SizeGroup`]: files sharing an exact byte size (output of the scan)
//! - [`DuplicateGroup`]: files sharing a full content hash (final result)
//!
//! ## Size Grouping (Phase 1)
//!
//! Size grouping is the first phase of duplicate detection. Files with
//! different sizes cannot be duplicates, so every size seen only once is
//! dropped before any byte is read.
//!
//! # Example
//!
//! ```
//! use dupedetector::scanner::FileRecord;
//! use dupedetector::duplicates::{retain_candidates, SizeGroup};
//! use std::collections::HashMap;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let mut by_size = HashMap::new();
//! for (path, size) in [("/a.txt", 1024), ("/b.txt", 1024), ("/c.txt", 2048)] {
//!     by_size
//!         .entry(size)
//!         .or_insert_with(|| SizeGroup::new(size))
//!         .add(FileRecord::new(PathBuf::from(path), size, SystemTime::now()));
//! }
//!
//! let (groups, stats) = retain_candidates(by_size);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;

use crate::scanner::{hash_to_hex, FileRecord};

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size
    pub files: Vec<FileRecord>,
}

impl SizeGroup {
    /// Create a new, empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Add a file to this group.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if file size doesn't match group size.
    pub fn add(&mut self, file: FileRecord) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match group size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Confirmed duplicate group of files.
///
/// After sorting, `files[0]` is the keeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// XXH64 hash of the file content
    pub hash: u64,
    /// File size in bytes (shared by all files)
    pub size: u64,
    /// Member files
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: u64, size: u64, files: Vec<FileRecord>) -> Self {
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The file to keep, once the group is sorted.
    #[must_use]
    pub fn keeper(&self) -> Option<&FileRecord> {
        self.files.first()
    }

    /// Number of duplicate copies (total - 1 keeper).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(self.hash)
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Drop every size group with fewer than two files.
///
/// Takes the full size map produced by the scanner and returns the
/// candidate groups together with grouping statistics.
#[must_use]
pub fn retain_candidates(
    all_groups: HashMap<u64, SizeGroup>,
) -> (HashMap<u64, SizeGroup>, GroupingStats) {
    let mut stats = GroupingStats::default();

    let filtered: HashMap<u64, SizeGroup> = all_groups
        .into_iter()
        .filter(|(size, group)| {
            stats.total_files += group.len();

            if group.has_duplicates() {
                stats.potential_duplicates += group.len();
                stats.duplicate_groups += 1;
                log::debug!(
                    "Size group {} bytes: {} potential duplicates",
                    size,
                    group.len()
                );
                true
            } else {
                stats.eliminated_unique += group.len();
                if let Some(file) = group.files.first() {
                    log::trace!("Eliminated unique size {}: {}", size, file.path.display());
                }
                false
            }
        })
        .collect();

    log::info!(
        "Phase 1 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (filtered, stats)
}
