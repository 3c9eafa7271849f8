//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Prehash comparison (Phase 2)
//! - Full hash comparison (Phase 3)
//! - Keeper selection by keep strategy
//! - The bounded worker pool shared by the hashing phases

pub mod finder;
pub mod groups;
pub mod sorter;
pub mod workers;

pub use finder::{
    phase2_prehash, phase3_fullhash, DuplicateFinder, FinderConfig, FinderError, FinderOptions,
    FullhashStats, PrehashKey, PrehashStats, Stats,
};
pub use groups::{retain_candidates, DuplicateGroup, GroupingStats, SizeGroup};
pub use sorter::{compare, sort_group, sort_groups, KeepStrategy, UnknownStrategy};
pub use workers::{default_workers, run_stage, StageOutcome};
