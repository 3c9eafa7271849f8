//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements [`ProgressCallback`]
//! to display progress bars in the terminal while the pipeline runs.
//!
//! The finder reports three phases: `"scanning"`, `"prehash"` and `"fullhash"`.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Phase name for the directory walk.
pub const PHASE_SCANNING: &str = "scanning";
/// Phase name for first-block hashing.
pub const PHASE_PREHASH: &str = "prehash";
/// Phase name for full-content hashing.
pub const PHASE_FULLHASH: &str = "fullhash";

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline. Calls may come from any thread.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "prehash", "fullhash")
    /// * `total` - Total number of items to process (`0` if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
///
/// Manages one bar per pipeline phase.
pub struct Progress {
    multi: MultiProgress,
    scanning: Mutex<Option<ProgressBar>>,
    prehash: Mutex<Option<ProgressBar>>,
    fullhash: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupedetector::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let multi = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };
        Self {
            multi,
            scanning: Mutex::new(None),
            prehash: Mutex::new(None),
            fullhash: Mutex::new(None),
            quiet,
        }
    }

    fn slot(&self, phase: &str) -> Option<MutexGuard<'_, Option<ProgressBar>>> {
        let slot = match phase {
            PHASE_SCANNING => &self.scanning,
            PHASE_PREHASH => &self.prehash,
            PHASE_FULLHASH => &self.fullhash,
            _ => return None,
        };
        Some(slot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// The bar of the latest phase still running.
    fn active(&self) -> Option<ProgressBar> {
        [PHASE_FULLHASH, PHASE_PREHASH, PHASE_SCANNING]
            .into_iter()
            .find_map(|phase| self.slot(phase).and_then(|s| s.clone()))
    }

    fn scanning_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = match phase {
            PHASE_SCANNING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::scanning_style());
                pb.set_message("Scanning directory");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            PHASE_PREHASH | PHASE_FULLHASH => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message(if phase == PHASE_PREHASH {
                    "Prehashing"
                } else {
                    "Full hashing"
                });
                pb
            }
            _ => return,
        };

        if let Some(mut slot) = self.slot(phase) {
            *slot = Some(pb);
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.active() {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 30));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.slot(phase).and_then(|mut s| s.take()) {
            pb.finish_and_clear();
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.active() {
            pb.set_message(message.to_string());
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
