//! Logging setup using the `log` facade and `env_logger` backend.
//!
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Debug builds print a timestamp and the module path; release builds print
//! only the level and message.
//!
//! ```rust,no_run
//! use dupedetector::logging::init_logging;
//!
//! init_logging(1, false); // -v
//! log::debug!("visible");
//! ```

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize logging from the CLI verbosity flags.
///
/// Safe to call more than once: only the first call installs a logger.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=info, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by `RUST_LOG`)
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var("RUST_LOG").is_ok();
    let level = determine_level(verbose, quiet);

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
    }
    configure_format(&mut builder);

    if builder.try_init().is_err() {
        log::trace!("Logger already initialized");
        return;
    }

    if use_env {
        log::debug!("Logging initialized from RUST_LOG: {:?}", env::var("RUST_LOG").ok());
    } else {
        log::debug!("Logging initialized at level: {:?}", level);
    }
}

/// Map CLI flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(debug_assertions)]
fn configure_format(builder: &mut Builder) {
    builder.format(|buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);
        writeln!(
            buf,
            "{} {level_style}{:<5}{level_style:#} [{}] {}",
            buf.timestamp_seconds(),
            level,
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });
}

#[cfg(not(debug_assertions))]
fn configure_format(builder: &mut Builder) {
    builder.format(|buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);
        writeln!(buf, "{level_style}{:<5}{level_style:#} {}", level, record.args())
    });
}
