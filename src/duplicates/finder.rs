//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Phase 1 - Size grouping**: Walk the tree and group files by size
//!    (see [`crate::scanner::walker`] and [`crate::duplicates::groups`])
//! 2. **Phase 2 - Prehash**: Hash the first 4KB of same-size files
//! 3. **Phase 3 - Full hash**: Hash the entire content of prehash matches
//! 4. **Finalization**: Sort each group so that index 0 is the keeper
//!
//! Each phase only sees files that survived the previous one in a group of
//! two or more, and each hashing phase is a full barrier over a bounded
//! worker pool (see [`crate::duplicates::workers`]).
//!
//! # Example
//!
//! ```no_run
//! use dupedetector::duplicates::{DuplicateFinder, FinderConfig, KeepStrategy};
//! use std::path::Path;
//!
//! let config = FinderConfig::default()
//!     .with_min_size(1)
//!     .with_keep_strategy(KeepStrategy::Newest);
//! let stats = DuplicateFinder::new(config).find_duplicates(Path::new(".")).unwrap();
//!
//! for group in &stats.hash_groups {
//!     println!("{} keeps {}", group.hash_hex(), group.files[0].path.display());
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::groups::retain_candidates;
use super::sorter::{sort_groups, KeepStrategy};
use super::workers::run_stage;
use super::{DuplicateGroup, SizeGroup};
use crate::progress::{ProgressCallback, PHASE_FULLHASH, PHASE_PREHASH, PHASE_SCANNING};
use crate::scanner::{hash_to_hex, FileRecord, Hasher, ScanError, Scanner, ScannerConfig};

/// Files above this size get a debug line when hashed.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Grouping key for the prehash phase: `(size, first-block hash)`.
pub type PrehashKey = (u64, u64);

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Minimum file size in bytes (inclusive).
    pub min_size: u64,
    /// Directory names pruned anywhere below the root.
    pub excluded_dirs: HashSet<String>,
    /// Policy used to order each group.
    pub keep_strategy: KeepStrategy,
    /// Worker threads per hashing phase (`0` = available parallelism).
    pub workers: usize,
    /// Confirm hash matches byte by byte.
    pub paranoid: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("min_size", &self.min_size)
            .field("excluded_dirs", &self.excluded_dirs)
            .field("keep_strategy", &self.keep_strategy)
            .field("workers", &self.workers)
            .field("paranoid", &self.paranoid)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the minimum file size.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the excluded directory names.
    #[must_use]
    pub fn with_excluded_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the keep strategy.
    #[must_use]
    pub fn with_keep_strategy(mut self, strategy: KeepStrategy) -> Self {
        self.keep_strategy = strategy;
        self
    }

    /// Set the worker count per phase (`0` = available parallelism).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable paranoid mode (byte-by-byte verification).
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn shutdown(&self) -> Option<&AtomicBool> {
        self.shutdown_flag.as_deref()
    }

    fn scanner(&self) -> Scanner {
        let scanner = Scanner::new(ScannerConfig {
            min_size: self.min_size,
            excluded_dirs: self.excluded_dirs.clone(),
        });
        match self.shutdown_flag {
            Some(ref flag) => scanner.with_shutdown_flag(Arc::clone(flag)),
            None => scanner,
        }
    }
}

/// The three core options of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderOptions {
    /// Minimum file size in bytes (inclusive)
    pub min_size: u64,
    /// Directory names to prune
    pub excluded_dirs: HashSet<String>,
    /// Keeper policy
    pub keep_strategy: KeepStrategy,
}

impl From<FinderOptions> for FinderConfig {
    fn from(options: FinderOptions) -> Self {
        FinderConfig {
            min_size: options.min_size,
            excluded_dirs: options.excluded_dirs,
            keep_strategy: options.keep_strategy,
            ..FinderConfig::default()
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Regular files accepted by the scanner
    pub total_files_scanned: usize,
    /// Confirmed groups, each sorted keeper-first, ordered by hash then keeper path
    pub hash_groups: Vec<DuplicateGroup>,
    /// Sum over groups of `len - 1`
    pub duplicate_count: usize,
    /// Wall-clock duration of the run
    pub duration: Duration,
    /// Files in size groups of two or more
    pub candidates_after_size: usize,
    /// Files in prehash groups of two or more
    pub candidates_after_prehash: usize,
    /// Files dropped because hashing or comparing them failed
    pub failed_files: usize,
    /// Scan entries skipped because of errors
    pub skipped_entries: usize,
}

impl Stats {
    /// Look up a group by its content hash.
    #[must_use]
    pub fn group(&self, hash: u64) -> Option<&DuplicateGroup> {
        self.hash_groups.iter().find(|g| g.hash == hash)
    }

    /// Whether any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.hash_groups.is_empty()
    }
}

/// Statistics from the prehash phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrehashStats {
    /// Files entering the phase
    pub input_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files that could not be read
    pub failed_files: usize,
    /// Files whose `(size, prehash)` was unique
    pub unique_prehashes: usize,
    /// Files remaining in groups of 2+
    pub potential_duplicates: usize,
    /// Groups of 2+
    pub duplicate_groups: usize,
    /// Whether the phase stopped early
    pub interrupted: bool,
}

impl PrehashStats {
    /// Percentage of input files eliminated by prehash.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            let eliminated = self.input_files.saturating_sub(self.potential_duplicates);
            (eliminated as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Statistics from the full-hash phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullhashStats {
    /// Files entering the phase
    pub input_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files that could not be read or compared
    pub failed_files: usize,
    /// Files dropped because their size changed since the scan
    pub size_changed: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Files split off by byte comparison in paranoid mode
    pub paranoid_rejected: usize,
    /// Confirmed groups
    pub duplicate_groups: usize,
    /// Confirmed duplicates (excluding one keeper per group)
    pub duplicate_files: usize,
    /// Whether the phase stopped early
    pub interrupted: bool,
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The root could not be scanned.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,
}

// ============================================================================
// Phase 2 - Prehash
// ============================================================================

/// Hash the first block of every candidate and regroup by `(size, prehash)`.
///
/// Only groups with 2+ files are returned. Files that cannot be read are
/// logged and dropped.
pub fn phase2_prehash(
    size_groups: HashMap<u64, SizeGroup>,
    hasher: &Arc<Hasher>,
    config: &FinderConfig,
) -> (HashMap<PrehashKey, Vec<FileRecord>>, PrehashStats) {
    let jobs: Vec<FileRecord> = size_groups.into_values().flat_map(|g| g.files).collect();
    let mut stats = PrehashStats {
        input_files: jobs.len(),
        ..PrehashStats::default()
    };

    if jobs.is_empty() {
        log::debug!("Phase 2: No files to process");
        return (HashMap::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_PREHASH, jobs.len());
    }
    log::info!("Phase 2: Computing prehashes for {} files", jobs.len());

    let mut groups: HashMap<PrehashKey, Vec<FileRecord>> = HashMap::new();
    let mut done = 0usize;

    let outcome = run_stage(
        jobs,
        config.workers,
        config.shutdown(),
        |file: FileRecord| {
            let result = hasher.hash_first_block(&file.path);
            (file, result)
        },
        |(file, result)| {
            done += 1;
            if let Some(ref callback) = config.progress_callback {
                callback.on_progress(done, &file.path.to_string_lossy());
            }
            match result {
                Ok(prehash) => {
                    stats.hashed_files += 1;
                    log::trace!("Prehash computed: {}", file.path.display());
                    groups.entry((file.size, prehash)).or_default().push(file);
                }
                Err(e) => {
                    stats.failed_files += 1;
                    log::warn!("Failed to prehash {}: {}", file.path.display(), e);
                }
            }
        },
    );

    stats.interrupted = outcome.interrupted;
    if outcome.interrupted {
        log::info!("Phase 2: Interrupted by shutdown signal");
    }
    let lost = outcome.lost();
    if lost > 0 {
        stats.failed_files += lost;
        log::warn!("Phase 2: {} files were not prehashed because a worker panicked", lost);
    }

    groups.retain(|(size, prehash), files| {
        if files.len() < 2 {
            stats.unique_prehashes += files.len();
            log::trace!(
                "Eliminated unique prehash {} ({} bytes)",
                hash_to_hex(*prehash),
                size
            );
            false
        } else {
            stats.potential_duplicates += files.len();
            stats.duplicate_groups += 1;
            log::debug!(
                "Prehash group {} ({} bytes): {} potential duplicates",
                hash_to_hex(*prehash),
                size,
                files.len()
            );
            true
        }
    });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_PREHASH);
    }

    log::info!(
        "Phase 2 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.input_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}

// ============================================================================
// Phase 3 - Full hash
// ============================================================================

/// Hash every prehash survivor and regroup by full content hash.
///
/// Each record is refreshed from the metadata of the handle that was hashed:
/// size, device and inode always, mtime only when the keep strategy orders
/// by it. A file whose size changed since the scan is dropped. In paranoid
/// mode every group is further split into byte-identical subsets.
///
/// Returned groups are unsorted.
pub fn phase3_fullhash(
    prehash_groups: HashMap<PrehashKey, Vec<FileRecord>>,
    hasher: &Arc<Hasher>,
    config: &FinderConfig,
) -> (Vec<DuplicateGroup>, FullhashStats) {
    let jobs: Vec<FileRecord> = prehash_groups.into_values().flatten().collect();
    let mut stats = FullhashStats {
        input_files: jobs.len(),
        ..FullhashStats::default()
    };

    if jobs.is_empty() {
        log::debug!("Phase 3: No files to process");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_FULLHASH, jobs.len());
    }
    log::info!("Phase 3: Computing full hashes for {} files", jobs.len());

    let needs_mod_time = config.keep_strategy.needs_mod_time();
    let mut by_hash: HashMap<(u64, u64), Vec<FileRecord>> = HashMap::new();
    let mut done = 0usize;

    let outcome = run_stage(
        jobs,
        config.workers,
        config.shutdown(),
        |file: FileRecord| {
            if file.size > LARGE_FILE_THRESHOLD {
                log::debug!(
                    "Hashing large file ({} MB): {}",
                    file.size / (1024 * 1024),
                    file.path.display()
                );
            }
            let result = hasher.hash_file(&file.path);
            (file, result)
        },
        |(mut file, result)| {
            done += 1;
            if let Some(ref callback) = config.progress_callback {
                callback.on_progress(done, &file.path.to_string_lossy());
            }
            match result {
                Ok((hash, file_stats)) => {
                    if file_stats.size != file.size {
                        stats.size_changed += 1;
                        log::warn!(
                            "File changed size during scan ({} → {} bytes), skipping: {}",
                            file.size,
                            file_stats.size,
                            file.path.display()
                        );
                        return;
                    }
                    stats.hashed_files += 1;
                    stats.bytes_hashed += file_stats.size;
                    file.device_id = file_stats.device_id;
                    file.inode = file_stats.inode;
                    if needs_mod_time {
                        file.modified = file_stats.modified;
                    }
                    file.set_content_hash(hash);
                    by_hash.entry((file.size, hash)).or_default().push(file);
                }
                Err(e) => {
                    stats.failed_files += 1;
                    log::warn!("Failed to hash {}: {}", file.path.display(), e);
                }
            }
        },
    );

    stats.interrupted = outcome.interrupted;
    if outcome.interrupted {
        log::info!("Phase 3: Interrupted by shutdown signal");
    }
    let lost = outcome.lost();
    if lost > 0 {
        stats.failed_files += lost;
        log::warn!("Phase 3: {} files were not hashed because a worker panicked", lost);
    }

    let mut groups: Vec<DuplicateGroup> = by_hash
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|((size, hash), files)| DuplicateGroup::new(hash, size, files))
        .collect();

    if config.paranoid && !stats.interrupted {
        groups = verify_groups(groups, hasher, config, &mut stats);
    }

    for group in &groups {
        log::debug!(
            "Duplicate group {}: {} files, {} bytes each",
            group.hash_hex(),
            group.len(),
            group.size
        );
    }
    stats.duplicate_groups = groups.len();
    stats.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_FULLHASH);
    }

    log::info!(
        "Phase 3 complete: {} groups, {} duplicates, {} bytes hashed",
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.bytes_hashed
    );

    (groups, stats)
}

/// Split each group into byte-identical subsets on the worker pool.
fn verify_groups(
    groups: Vec<DuplicateGroup>,
    hasher: &Arc<Hasher>,
    config: &FinderConfig,
    stats: &mut FullhashStats,
) -> Vec<DuplicateGroup> {
    log::info!("Paranoid mode: verifying {} groups byte by byte", groups.len());
    if let Some(ref callback) = config.progress_callback {
        callback.on_message("verifying byte by byte");
    }

    let input_files: usize = groups.iter().map(DuplicateGroup::len).sum();
    let mut settled_files = 0usize;
    let mut verified = Vec::with_capacity(groups.len());
    let outcome = run_stage(
        groups,
        config.workers,
        config.shutdown(),
        |group: DuplicateGroup| {
            let (subsets, failures) = split_identical(hasher, group.files);
            (group.hash, group.size, subsets, failures)
        },
        |(hash, size, subsets, failures)| {
            settled_files += failures + subsets.iter().map(Vec::len).sum::<usize>();
            stats.failed_files += failures;
            for subset in subsets {
                if subset.len() > 1 {
                    verified.push(DuplicateGroup::new(hash, size, subset));
                } else {
                    stats.paranoid_rejected += subset.len();
                    if let Some(file) = subset.first() {
                        log::warn!(
                            "Hash collision: {} matches by hash but not by content",
                            file.path.display()
                        );
                    }
                }
            }
        },
    );
    stats.interrupted |= outcome.interrupted;
    if outcome.lost() > 0 {
        let lost_files = input_files.saturating_sub(settled_files);
        stats.failed_files += lost_files;
        log::warn!(
            "Paranoid check: {} files were not verified because a worker panicked",
            lost_files
        );
    }
    verified
}

/// Partition files into subsets whose contents are identical.
///
/// Files sharing an identity are the same data and are not read. Returns
/// the subsets and the number of files dropped because a comparison failed.
fn split_identical(hasher: &Hasher, files: Vec<FileRecord>) -> (Vec<Vec<FileRecord>>, usize) {
    let mut subsets: Vec<Vec<FileRecord>> = Vec::new();
    let mut failures = 0;

    'files: for file in files {
        for subset in &mut subsets {
            let representative = &subset[0];
            let same = match (representative.identity(), file.identity()) {
                (Some(a), Some(b)) if a == b => Ok(true),
                _ => hasher.files_identical(&representative.path, &file.path),
            };
            match same {
                Ok(true) => {
                    subset.push(file);
                    continue 'files;
                }
                Ok(false) => {}
                Err(e) => {
                    failures += 1;
                    log::warn!("Failed to compare {}: {}", file.path.display(), e);
                    continue 'files;
                }
            }
        }
        subsets.push(vec![file]);
    }

    (subsets, failures)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Duplicate finder that orchestrates the multi-phase detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupedetector::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
/// match finder.find_duplicates(Path::new(".")) {
///     Ok(stats) => println!("Found {} duplicate groups", stats.hash_groups.len()),
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Arc::new(Hasher::new()),
        }
    }

    /// Run the pipeline with only the core options.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::find_duplicates`].
    pub fn run(root: &Path, options: FinderOptions) -> Result<Stats, FinderError> {
        Self::new(options.into()).find_duplicates(root)
    }

    /// Find all duplicate files under `root`.
    ///
    /// # Errors
    ///
    /// - [`FinderError::Scan`] if the root cannot be read
    /// - [`FinderError::Interrupted`] if the shutdown flag was set; the
    ///   running stage is allowed to drain first
    pub fn find_duplicates(&self, root: &Path) -> Result<Stats, FinderError> {
        let start_time = Instant::now();
        let config = &self.config;

        // Phase 1: scan and size grouping
        if let Some(ref callback) = config.progress_callback {
            callback.on_phase_start(PHASE_SCANNING, 0);
        }
        log::info!("Scanning {}", root.display());
        let scanned = config.scanner().scan(root);
        if let Some(ref callback) = config.progress_callback {
            callback.on_phase_end(PHASE_SCANNING);
        }
        let (by_size, scan_stats) = scanned?;
        self.check_interrupted()?;

        let (size_groups, size_stats) = retain_candidates(by_size);

        // Phase 2
        let (prehash_groups, prehash_stats) = phase2_prehash(size_groups, &self.hasher, config);
        if prehash_stats.interrupted {
            return Err(FinderError::Interrupted);
        }
        self.check_interrupted()?;

        // Phase 3
        let (mut groups, fullhash_stats) = phase3_fullhash(prehash_groups, &self.hasher, config);
        if fullhash_stats.interrupted {
            return Err(FinderError::Interrupted);
        }
        self.check_interrupted()?;

        // Finalization
        sort_groups(&mut groups, config.keep_strategy);
        groups.sort_by(|a, b| {
            a.hash
                .cmp(&b.hash)
                .then_with(|| a.size.cmp(&b.size))
                .then_with(|| {
                    let ka = a.keeper().map(|f| f.path.as_os_str());
                    let kb = b.keeper().map(|f| f.path.as_os_str());
                    ka.cmp(&kb)
                })
        });

        let stats = Stats {
            total_files_scanned: scan_stats.files_accepted,
            duplicate_count: groups.iter().map(DuplicateGroup::duplicate_count).sum(),
            hash_groups: groups,
            duration: start_time.elapsed(),
            candidates_after_size: size_stats.potential_duplicates,
            candidates_after_prehash: prehash_stats.potential_duplicates,
            failed_files: prehash_stats.failed_files
                + fullhash_stats.failed_files
                + fullhash_stats.size_changed,
            skipped_entries: scan_stats.skipped_entries,
        };

        log::info!(
            "Found {} duplicate groups ({} duplicates) in {:.2?}",
            stats.hash_groups.len(),
            stats.duplicate_count,
            stats.duration
        );

        Ok(stats)
    }

    fn check_interrupted(&self) -> Result<(), FinderError> {
        if self.config.is_shutdown_requested() {
            log::info!("Shutdown requested, stopping after current stage");
            Err(FinderError::Interrupted)
        } else {
            Ok(())
        }
    }
}
