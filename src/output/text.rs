//! Human-readable listing for the terminal.

use std::io::Write;

use bytesize::ByteSize;

use super::report::Report;
use crate::actions::{ActionMode, BatchResult};
use crate::scanner::hash_to_hex;

/// Plain-text view of a [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    report: &'a Report,
    dry_run: bool,
}

impl<'a> TextOutput<'a> {
    /// Wrap a report. In a dry run, victims are listed as candidates and
    /// action hints are printed after the summary.
    #[must_use]
    pub fn new(report: &'a Report, dry_run: bool) -> Self {
        Self { report, dry_run }
    }

    /// Write the listing followed by the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for group in &self.report.groups {
            writeln!(
                writer,
                "[{}] {} x{}  keep: {}",
                ByteSize::b(group.file_size),
                hash_to_hex(group.hash),
                1 + group.victims.len() + group.hardlinks.len(),
                group.keeper.path.display()
            )?;
            for link in &group.hardlinks {
                writeln!(writer, "  [hardlink]  {} (0 B)", link.display())?;
            }
            if self.dry_run {
                for victim in &group.victims {
                    writeln!(writer, "  [candidate] {}", victim.path.display())?;
                }
            }
            writeln!(writer)?;
        }

        self.write_summary(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let summary = &self.report.summary;

        writeln!(
            writer,
            "Scanned {} files in {}",
            summary.total_files_scanned, self.report.metadata.duration_human
        )?;
        if !self.report.has_duplicates() {
            writeln!(writer, "No duplicates found.")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{} groups, {} duplicates, {} hard links",
            self.report.groups.len(),
            summary.total_duplicates,
            summary.total_hard_links
        )?;
        writeln!(writer, "Reclaimable: {}", summary.bytes_saved_human)?;

        if self.dry_run && summary.total_duplicates > 0 {
            writeln!(writer)?;
            writeln!(writer, "Dry run, nothing was changed. To act on the candidates:")?;
            writeln!(writer, "  --trash          move them to the trash directory")?;
            writeln!(writer, "  --output <FILE>  write a removal script for review")?;
            writeln!(writer, "  --delete         remove them permanently")?;
        }
        Ok(())
    }
}

/// Print the outcome of a trash/delete batch.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_batch_result<W: Write>(
    writer: &mut W,
    mode: ActionMode,
    result: &BatchResult,
) -> std::io::Result<()> {
    let verb = match mode {
        ActionMode::Trash => "Moved to trash",
        ActionMode::Delete => "Deleted",
    };
    writeln!(
        writer,
        "{verb}: {} files, {} freed",
        result.succeeded.len(),
        ByteSize::b(result.bytes_freed)
    )?;
    if !result.failed.is_empty() {
        writeln!(writer, "Failed: {} files", result.failed.len())?;
        for (path, err) in &result.failed {
            writeln!(writer, "  {}: {err}", path.display())?;
        }
    }
    Ok(())
}
