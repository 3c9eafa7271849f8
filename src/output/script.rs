//! Shell script generation for reviewing duplicate removal.
//!
//! Instead of deleting anything, the `--output` action writes a POSIX shell
//! script with one `rm -v` line per victim. Keepers and hardlinks never
//! appear as commands. Groups without victims are left out.
//!
//! ```text
//! #!/bin/sh
//! # Duplicate removal script generated by dupedetector
//! # ...
//! echo 'Starting cleanup...'
//!
//! # Group Hash: 9f3c0a1b2c3d4e5f
//! # Keeper: '/data/a.txt'
//! rm -v '/data/copy/a.txt'
//! ```

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use bytesize::ByteSize;

use super::report::Report;

/// Formatter for shell script output.
#[derive(Debug, Clone, Copy)]
pub struct ScriptOutput<'a> {
    report: &'a Report,
}

impl<'a> ScriptOutput<'a> {
    /// Create a new script output formatter.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Write the generated script to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let summary = &self.report.summary;

        writeln!(writer, "#!/bin/sh")?;
        writeln!(writer, "# Duplicate removal script generated by dupedetector")?;
        writeln!(
            writer,
            "# Generated on: {}",
            self.report.metadata.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        write_quoted(writer, "# Scanned: ", &self.report.metadata.scanned_path)?;
        writeln!(writer, "# Keep strategy: {}", self.report.metadata.strategy)?;
        writeln!(writer, "#")?;
        writeln!(writer, "# WARNING: This script will PERMANENTLY DELETE files.")?;
        writeln!(writer, "# Please review carefully before executing.")?;
        writeln!(writer, "#")?;
        writeln!(writer, "# Files to remove: {}", summary.total_duplicates)?;
        writeln!(
            writer,
            "# Reclaimable space: {}",
            ByteSize::b(summary.bytes_saved)
        )?;
        writeln!(writer, "echo 'Starting cleanup...'")?;
        writeln!(writer)?;

        for group in self.report.groups.iter().filter(|g| !g.victims.is_empty()) {
            writeln!(writer, "# Group Hash: {:016x}", group.hash)?;
            write_quoted(writer, "# Keeper: ", &group.keeper.path)?;
            for victim in &group.victims {
                write_quoted(writer, "rm -v ", &victim.path)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    /// Write the script to `path` and mark it executable on Unix.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        drop(writer);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
        }

        log::info!("Wrote removal script to {}", path.display());
        Ok(())
    }
}

fn write_quoted<W: Write>(writer: &mut W, prefix: &str, path: &Path) -> io::Result<()> {
    writer.write_all(prefix.as_bytes())?;
    writer.write_all(&escape_posix(path))?;
    writer.write_all(b"\n")
}

/// Quote a path for POSIX sh: wrap in single quotes, escape `'` as `'\''`.
///
/// Works on the raw path bytes, so names that are not valid UTF-8 are
/// written unchanged.
fn escape_posix(path: &Path) -> Vec<u8> {
    let raw = path_bytes(path);
    let mut quoted = Vec::with_capacity(raw.len() + 2);
    quoted.push(b'\'');
    for &byte in raw.iter() {
        if byte == b'\'' {
            quoted.extend_from_slice(b"'\\''");
        } else {
            quoted.push(byte);
        }
    }
    quoted.push(b'\'');
    quoted
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    Cow::Owned(path.to_string_lossy().into_owned().into_bytes())
}
