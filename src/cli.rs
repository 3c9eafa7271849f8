//! Command-line interface definitions for dupedetector.
//!
//! A single flat command: scan one root, then report or act on the result.
//!
//! # Example
//!
//! ```bash
//! # Dry run: list duplicates and reclaimable space
//! dupedetector ~/Downloads
//!
//! # JSON report for scripting
//! dupedetector ~/Downloads --json
//!
//! # Keep the newest copy and move the rest into TRASH_BIN
//! dupedetector ~/Downloads --keep newest --trash
//!
//! # Write a removal script to review first
//! dupedetector ~/Downloads -o cleanup.sh
//! ```

use bytesize::ByteSize;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::duplicates::KeepStrategy;

/// Fast duplicate file detector with hardlink-aware keeper selection.
///
/// Files are grouped by size, then by a hash of their first block, then by a
/// full content hash. Without an action flag nothing is changed.
#[derive(Debug, Parser)]
#[command(name = "dupedetector")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .args(["trash", "delete", "output"])
        .multiple(false)
))]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(short, long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Which copy to keep in each group
    #[arg(short, long, value_enum, value_name = "STRATEGY")]
    pub keep: Option<KeepStrategy>,

    /// Directory names to skip at any depth (added to the configured list)
    #[arg(short, long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Print the report as JSON instead of text
    #[arg(long, conflicts_with_all = ["trash", "delete"])]
    pub json: bool,

    /// Write a shell script that removes the duplicates
    #[arg(short, long, value_name = "SCRIPT")]
    pub output: Option<PathBuf>,

    /// Move duplicates into the trash directory
    #[arg(long)]
    pub trash: bool,

    /// Permanently delete duplicates
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long)]
    pub delete: bool,

    /// Trash directory used by --trash
    #[arg(long, value_name = "DIR")]
    pub trash_dir: Option<PathBuf>,

    /// Number of hashing threads (0 = available parallelism)
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Byte-by-byte verification after hash match
    ///
    /// Slower but guarantees no hash collisions.
    #[arg(long)]
    pub paranoid: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// True when no action flag was given.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        !self.trash && !self.delete && self.output.is_none()
    }
}

/// Size argument parser; accepts plain bytes or SI/IEC suffixes (`1KB`, `4KiB`).
fn parse_size(s: &str) -> Result<u64, String> {
    s.trim()
        .parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("invalid size '{s}': {e}"))
}
