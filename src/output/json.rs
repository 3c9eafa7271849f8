//! JSON output formatter for duplicate reports.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "metadata": {
//!     "scanned_path": ".",
//!     "strategy": "shortest",
//!     "timestamp": "2024-01-01T00:00:00Z",
//!     "duration_human": "1.23s"
//!   },
//!   "summary": {
//!     "total_files_scanned": 100,
//!     "total_duplicates": 3,
//!     "total_hard_links": 1,
//!     "bytes_saved": 3072,
//!     "bytes_saved_human": "3.0 KiB"
//!   },
//!   "groups": [
//!     {
//!       "hash": "9f3c0a1b2c3d4e5f",
//!       "file_size": 1024,
//!       "keeper": { "path": "./a.txt", "size": 1024, "modified": "...", "device_id": 1, "inode": 2 },
//!       "victims": [{ "path": "./copy/a.txt", "size": 1024 }],
//!       "hardlinks": ["./link.txt"]
//!     }
//!   ]
//! }
//! ```

use std::io::Write;

use super::report::Report;

/// JSON view of a [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct JsonOutput<'a> {
    report: &'a Report,
}

impl<'a> JsonOutput<'a> {
    /// Wrap a report for JSON output.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.report)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self.report)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
