//! Layered configuration.
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. TOML file (`--config <FILE>`, else `<config dir>/dupedetector/config.toml`)
//! 3. Environment variables prefixed with `DUPEDETECTOR_`
//! 4. Command-line flags (see [`Config::apply_cli`])
//!
//! ```toml
//! min_size = 4096
//! exclude = [".git", "node_modules", "target"]
//! keep = "oldest"
//! workers = 8
//! trash_dir = "/tmp/dupes"
//! paranoid = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::duplicates::KeepStrategy;

/// Prefix for environment overrides, e.g. `DUPEDETECTOR_MIN_SIZE=0`.
pub const ENV_PREFIX: &str = "DUPEDETECTOR_";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `keep` names no known strategy.
    #[error("unknown keep strategy '{0}' (expected one of: shortest, longest, oldest, newest)")]
    UnknownKeepStrategy(String),

    /// A source could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Smallest file size considered, in bytes (inclusive)
    pub min_size: u64,
    /// Directory names pruned at any depth
    pub exclude: Vec<String>,
    /// Keep strategy name
    pub keep: String,
    /// Hashing threads; 0 means available parallelism
    pub workers: usize,
    /// Destination for `--trash`
    pub trash_dir: PathBuf,
    /// Byte-compare files after a hash match
    pub paranoid: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size: 1024,
            exclude: [".git", "node_modules", ".DS_Store", "TRASH_BIN"]
                .into_iter()
                .map(String::from)
                .collect(),
            keep: KeepStrategy::default().as_str().to_string(),
            workers: 0,
            trash_dir: PathBuf::from("TRASH_BIN"),
            paranoid: false,
        }
    }
}

impl Config {
    /// Load defaults, the TOML file and the environment.
    ///
    /// An explicit `path` that does not exist is an error. The default
    /// per-user file is optional.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a source is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(path) => {
                if !path.is_file() {
                    let message = format!("config file not found: {}", path.display());
                    return Err(ConfigError::Load(Box::new(figment::Error::from(message))));
                }
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default) = Self::default_path() {
                    log::trace!("Looking for config at {}", default.display());
                    figment = figment.merge(Toml::file(default));
                }
            }
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Platform-specific default config file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupedetector").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Overlay command-line flags. Excludes are added, everything else replaces.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(min_size) = cli.min_size {
            self.min_size = min_size;
        }
        if let Some(keep) = cli.keep {
            self.keep = keep.as_str().to_string();
        }
        for name in &cli.exclude {
            if !self.exclude.contains(name) {
                self.exclude.push(name.clone());
            }
        }
        if let Some(workers) = cli.workers {
            self.workers = workers;
        }
        if let Some(dir) = &cli.trash_dir {
            self.trash_dir = dir.clone();
        }
        self.paranoid |= cli.paranoid;
    }

    /// Parse the configured keep strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKeepStrategy`] for an unrecognized name.
    pub fn keep_strategy(&self) -> Result<KeepStrategy, ConfigError> {
        self.keep
            .parse()
            .map_err(|_| ConfigError::UnknownKeepStrategy(self.keep.clone()))
    }
}
