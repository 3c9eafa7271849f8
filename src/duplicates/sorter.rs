//! Keeper selection by deterministic in-group ordering.
//!
//! Each confirmed group is sorted so that `files[0]` is the file to keep.
//! The order is a chain of comparators evaluated left to right; the first
//! one that does not return `Equal` decides:
//!
//! | Strategy   | Primary          | Tie-break         | Final             |
//! |------------|------------------|-------------------|-------------------|
//! | `shortest` | path length asc  | path length asc   | path bytes        |
//! | `longest`  | path length desc | path length desc  | path bytes        |
//! | `oldest`   | mtime asc        | path length asc   | path bytes        |
//! | `newest`   | mtime desc       | path length asc   | path bytes        |
//!
//! The final byte-wise path comparison makes the order total.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::DuplicateGroup;
use crate::scanner::FileRecord;

/// Policy for choosing which file of a group to keep.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum KeepStrategy {
    /// Keep the file with the shortest path
    #[default]
    Shortest,
    /// Keep the file with the longest path
    Longest,
    /// Keep the least recently modified file
    Oldest,
    /// Keep the most recently modified file
    Newest,
}

impl KeepStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [KeepStrategy; 4] = [
        KeepStrategy::Shortest,
        KeepStrategy::Longest,
        KeepStrategy::Oldest,
        KeepStrategy::Newest,
    ];

    /// Lowercase name used on the command line and in config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            KeepStrategy::Shortest => "shortest",
            KeepStrategy::Longest => "longest",
            KeepStrategy::Oldest => "oldest",
            KeepStrategy::Newest => "newest",
        }
    }

    /// Whether this strategy orders by modification time.
    #[must_use]
    pub fn needs_mod_time(self) -> bool {
        matches!(self, KeepStrategy::Oldest | KeepStrategy::Newest)
    }

    fn comparators(self) -> [Comparator; 3] {
        match self {
            KeepStrategy::Shortest => [path_len_asc, path_len_asc, path_bytes],
            KeepStrategy::Longest => [path_len_desc, path_len_desc, path_bytes],
            KeepStrategy::Oldest => [mtime_asc, path_len_asc, path_bytes],
            KeepStrategy::Newest => [mtime_desc, path_len_asc, path_bytes],
        }
    }
}

impl fmt::Display for KeepStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a strategy name is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown keep strategy '{0}' (expected shortest, longest, oldest or newest)")]
pub struct UnknownStrategy(pub String);

impl FromStr for KeepStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        KeepStrategy::ALL
            .into_iter()
            .find(|k| k.as_str() == lowered)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

type Comparator = fn(&FileRecord, &FileRecord) -> Ordering;

fn path_len_asc(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.path_len().cmp(&b.path_len())
}

fn path_len_desc(a: &FileRecord, b: &FileRecord) -> Ordering {
    b.path_len().cmp(&a.path_len())
}

fn mtime_asc(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.modified.cmp(&b.modified)
}

fn mtime_desc(a: &FileRecord, b: &FileRecord) -> Ordering {
    b.modified.cmp(&a.modified)
}

fn path_bytes(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.path.as_os_str().cmp(b.path.as_os_str())
}

/// Compare two records under a strategy.
///
/// Never returns `Equal` for records with distinct paths.
#[must_use]
pub fn compare(a: &FileRecord, b: &FileRecord, strategy: KeepStrategy) -> Ordering {
    strategy
        .comparators()
        .iter()
        .map(|cmp| cmp(a, b))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Sort one group's files so that index 0 is the keeper.
pub fn sort_group(files: &mut [FileRecord], strategy: KeepStrategy) {
    if files.len() < 2 {
        return;
    }
    files.sort_by(|a, b| compare(a, b, strategy));
}

/// Sort every group in parallel. Membership is never changed.
pub fn sort_groups(groups: &mut [DuplicateGroup], strategy: KeepStrategy) {
    groups
        .par_iter_mut()
        .for_each(|group| sort_group(&mut group.files, strategy));
}
