//! File actions module.
//!
//! Victims from a [`Report`](crate::output::Report) can be:
//! - moved into a trash directory (recoverable)
//! - deleted permanently
//!
//! The third action, writing a review script, lives in
//! [`output::script`](crate::output::script) since it never touches files.
//!
//! ```no_run
//! use dupedetector::actions::{apply, ActionMode};
//! # use dupedetector::output::Report;
//! # fn demo(report: &Report) {
//! let result = apply(report, ActionMode::Trash, std::path::Path::new("TRASH_BIN"));
//! println!("{} files moved", result.succeeded.len());
//! # }
//! ```

pub mod delete;

pub use delete::{apply, move_to_trash_dir, permanent_delete, ActionMode, BatchResult, DeleteError};
