//! Hardlink-aware report built from a finished run.
//!
//! For each group, `files[0]` is the keeper. The remaining members are
//! walked in order and classified:
//!
//! - **hardlink**: shares `(device, inode)` with a member already seen in
//!   the group (the keeper is seen first); removing it frees nothing
//! - **victim**: separate data on disk; removing it frees its size
//!
//! Members with unknown identity (`(0, 0)`) are always victims.
//!
//! # Example
//!
//! ```no_run
//! use dupedetector::duplicates::{DuplicateFinder, FinderConfig, KeepStrategy};
//! use dupedetector::output::Report;
//! use std::path::Path;
//!
//! let stats = DuplicateFinder::new(FinderConfig::default()).find_duplicates(Path::new(".")).unwrap();
//! let report = Report::build(&stats, Path::new("."), KeepStrategy::Shortest);
//! println!("{} can be freed", report.summary.bytes_saved_human);
//! ```

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bytesize::ByteSize;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::duplicates::{DuplicateGroup, KeepStrategy, Stats};
use crate::scanner::{hash_to_hex, FileRecord, HardlinkTracker};

/// Complete report of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// How and when the run happened
    pub metadata: Metadata,
    /// Totals across all groups
    pub summary: Summary,
    /// One entry per duplicate group, largest size first
    pub groups: Vec<GroupResult>,
}

/// Run metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    /// Root directory as given by the user
    #[serde(serialize_with = "serialize_path")]
    pub scanned_path: PathBuf,
    /// Keep strategy in effect
    pub strategy: KeepStrategy,
    /// When the report was built
    pub timestamp: DateTime<Utc>,
    /// Run duration, human readable
    pub duration_human: String,
}

/// Report totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Files accepted by the scanner
    pub total_files_scanned: usize,
    /// Victims across all groups
    pub total_duplicates: usize,
    /// Hardlinks across all groups
    pub total_hard_links: usize,
    /// Sum of victim sizes
    pub bytes_saved: u64,
    /// `bytes_saved`, human readable
    pub bytes_saved_human: String,
}

/// One classified duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupResult {
    /// Content hash, serialized as 16 hex digits
    #[serde(serialize_with = "serialize_hash")]
    pub hash: u64,
    /// Size of every member
    pub file_size: u64,
    /// The file that stays
    pub keeper: Keeper,
    /// Separate copies that can be removed
    pub victims: Vec<Victim>,
    /// Extra names for data already kept or already listed
    #[serde(serialize_with = "serialize_paths")]
    pub hardlinks: Vec<PathBuf>,
}

/// The kept file of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keeper {
    /// Path
    #[serde(serialize_with = "serialize_path")]
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
    /// Device identifier (`0` when unavailable)
    pub device_id: u64,
    /// Inode number (`0` when unavailable)
    pub inode: u64,
}

impl From<&FileRecord> for Keeper {
    fn from(file: &FileRecord) -> Self {
        Self {
            path: file.path.clone(),
            size: file.size,
            modified: to_utc(file.modified),
            device_id: file.device_id,
            inode: file.inode,
        }
    }
}

/// A removable copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Victim {
    /// Path
    #[serde(serialize_with = "serialize_path")]
    pub path: PathBuf,
    /// Bytes freed by removing it
    pub size: u64,
}

impl GroupResult {
    /// Classify one sorted group. Returns `None` for groups under two files.
    #[must_use]
    pub fn classify(group: &DuplicateGroup) -> Option<Self> {
        let (keeper, rest) = group.files.split_first()?;
        if rest.is_empty() {
            return None;
        }

        let mut tracker = HardlinkTracker::with_capacity(group.len());
        tracker.record(keeper.identity());

        let mut victims = Vec::new();
        let mut hardlinks = Vec::new();
        for file in rest {
            if tracker.is_hardlink(file.identity()) {
                hardlinks.push(file.path.clone());
            } else {
                victims.push(Victim {
                    path: file.path.clone(),
                    size: file.size,
                });
            }
        }

        Some(Self {
            hash: group.hash,
            file_size: group.size,
            keeper: Keeper::from(keeper),
            victims,
            hardlinks,
        })
    }

    /// Bytes freed by removing every victim.
    #[must_use]
    pub fn bytes_saved(&self) -> u64 {
        self.victims.iter().map(|v| v.size).sum()
    }
}

impl Report {
    /// Build the report for a finished run.
    #[must_use]
    pub fn build(stats: &Stats, root: &Path, strategy: KeepStrategy) -> Self {
        let mut groups: Vec<GroupResult> = stats
            .hash_groups
            .iter()
            .filter_map(GroupResult::classify)
            .collect();

        groups.sort_by(|a, b| {
            b.file_size
                .cmp(&a.file_size)
                .then_with(|| a.keeper.path.as_os_str().cmp(b.keeper.path.as_os_str()))
                .then_with(|| a.hash.cmp(&b.hash))
        });

        let bytes_saved = groups.iter().map(GroupResult::bytes_saved).sum();
        let summary = Summary {
            total_files_scanned: stats.total_files_scanned,
            total_duplicates: groups.iter().map(|g| g.victims.len()).sum(),
            total_hard_links: groups.iter().map(|g| g.hardlinks.len()).sum(),
            bytes_saved,
            bytes_saved_human: ByteSize::b(bytes_saved).to_string(),
        };

        Self {
            metadata: Metadata {
                scanned_path: root.to_path_buf(),
                strategy,
                timestamp: Utc::now(),
                duration_human: format!("{:.2?}", stats.duration),
            },
            summary,
            groups,
        }
    }

    /// Whether there is anything to act on.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Every victim path, in report order.
    pub fn victims(&self) -> impl Iterator<Item = &Victim> {
        self.groups.iter().flat_map(|g| g.victims.iter())
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

fn serialize_hash<S: Serializer>(hash: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_to_hex(*hash))
}

fn serialize_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

fn serialize_paths<S: Serializer>(paths: &[PathBuf], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(paths.iter().map(|p| p.to_string_lossy()))
}
