//! dupedetector - fast duplicate file detector
//!
//! Finds files with identical content under one root using a three-stage
//! pipeline (size, first-block hash, full XXH64 hash), picks a keeper per
//! group by a configurable strategy, and tells hardlinks apart from real
//! copies so reclaimable space is never over-counted.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::actions::ActionMode;
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{JsonOutput, Report, ScriptOutput, TextOutput};
use crate::progress::Progress;

/// Run the application and return the exit code.
///
/// # Errors
///
/// Fatal errors only: bad configuration, an unreadable root, an interrupt,
/// or a failure writing output. Per-file problems are logged and counted.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    let strategy = config.keep_strategy()?;
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler().context("failed to set up Ctrl+C handling")?;
    let progress = Arc::new(Progress::new(cli.quiet || cli.json));

    let finder_config = FinderConfig::default()
        .with_min_size(config.min_size)
        .with_excluded_dirs(config.exclude.iter().cloned())
        .with_keep_strategy(strategy)
        .with_workers(config.workers)
        .with_paranoid(config.paranoid)
        .with_shutdown_flag(shutdown.get_flag())
        .with_progress_callback(progress);

    let stats = DuplicateFinder::new(finder_config).find_duplicates(&cli.path)?;
    let report = Report::build(&stats, &cli.path, strategy);
    if stats.failed_files > 0 || stats.skipped_entries > 0 {
        log::warn!(
            "{} files could not be hashed and {} entries could not be read",
            stats.failed_files,
            stats.skipped_entries
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.json {
        JsonOutput::new(&report).write_to(&mut out, true)?;
    } else if !cli.quiet {
        TextOutput::new(&report, cli.is_dry_run()).write_to(&mut out)?;
    }

    if let Some(script) = &cli.output {
        ScriptOutput::new(&report)
            .write_file(script)
            .with_context(|| format!("failed to write script {}", script.display()))?;
        if !cli.json && !cli.quiet {
            writeln!(out, "Removal script written to {}", script.display())?;
        }
    }

    let mode = if cli.trash {
        Some(ActionMode::Trash)
    } else if cli.delete {
        Some(ActionMode::Delete)
    } else {
        None
    };

    let mut code = if report.has_duplicates() {
        ExitCode::Success
    } else {
        ExitCode::NoDuplicates
    };

    if let Some(mode) = mode {
        let result = actions::apply(&report, mode, &config.trash_dir);
        if !cli.quiet {
            output::write_batch_result(&mut out, mode, &result)?;
        }
        if !result.all_succeeded() {
            code = ExitCode::PartialSuccess;
        }
    }

    out.flush()?;
    Ok(code)
}
