//! Output formatters for a finished run.
//!
//! Everything here consumes a [`Report`]:
//! - JSON for automation and scripting
//! - A POSIX shell script for manual review
//! - A plain-text listing for the terminal
//!
//! # Example
//!
//! ```no_run
//! use dupedetector::duplicates::{DuplicateFinder, FinderConfig, KeepStrategy};
//! use dupedetector::output::{JsonOutput, Report};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let stats = finder.find_duplicates(Path::new(".")).unwrap();
//! let report = Report::build(&stats, Path::new("."), KeepStrategy::Shortest);
//!
//! println!("{}", JsonOutput::new(&report).to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod report;
pub mod script;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use report::{GroupResult, Keeper, Metadata, Report, Summary, Victim};
pub use script::ScriptOutput;
pub use text::{write_batch_result, TextOutput};
