//! Removal of victims: permanent deletion or a move into a trash directory.
//!
//! # Overview
//!
//! Only victims listed in a [`Report`] are ever touched. Keepers and
//! hardlinks are left alone. A batch keeps going after a per-file failure
//! and reports every outcome in a [`BatchResult`].
//!
//! The trash is a plain directory (`TRASH_BIN` by default). Moved files are
//! renamed to `<stem>_<unix-nanos>.<ext>` so repeated runs don't clobber
//! each other.
//!
//! # Example
//!
//! ```no_run
//! use dupedetector::actions::delete::move_to_trash_dir;
//! use std::path::Path;
//!
//! match move_to_trash_dir(Path::new("copy/a.txt"), Path::new("TRASH_BIN")) {
//!     Ok(target) => println!("Moved to {}", target.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::output::Report;

/// Error type for removal operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved since the scan).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to remove or move.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The trash target name is already taken.
    #[error("trash target already exists: {0}")]
    Collision(PathBuf),

    /// Copy fallback failed while moving across filesystems.
    #[error("cross-device move failed for {path}: {source}")]
    CrossDevice {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Collision(p)
            | Self::CrossDevice { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// What to do with victims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    /// Move into the trash directory
    Trash,
    /// Remove permanently
    Delete,
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Victims removed or moved
    pub succeeded: Vec<PathBuf>,
    /// Victims left in place, with the reason
    pub failed: Vec<(PathBuf, DeleteError)>,
    /// Sum of the sizes of succeeded victims
    pub bytes_freed: u64,
}

impl BatchResult {
    /// Check if every victim was handled.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for any other failure
pub fn permanent_delete(path: &Path) -> Result<(), DeleteError> {
    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::from_io(path, e)
    })?;

    log::info!("Permanently deleted: {}", path.display());
    Ok(())
}

/// Move a file into `trash_dir`, creating the directory if needed.
///
/// The target name is reserved with an exclusive create before the move,
/// so a concurrent writer can never be overwritten. Returns the new
/// location of the file.
///
/// # Errors
///
/// - `Collision` if the generated target name already exists
/// - `CrossDevice` if the copy fallback fails
/// - `NotFound`, `PermissionDenied` or `Io` for the rename itself
pub fn move_to_trash_dir(path: &Path, trash_dir: &Path) -> Result<PathBuf, DeleteError> {
    fs::create_dir_all(trash_dir).map_err(|e| DeleteError::from_io(trash_dir, e))?;

    let target = trash_dir.join(trash_name(path));
    reserve(&target)?;

    match fs::rename(path, &target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!(
                "{} is on another filesystem, copying instead",
                path.display()
            );
            copy_then_remove(path, &target)?;
        }
        Err(e) => {
            discard(&target);
            return Err(DeleteError::from_io(path, e));
        }
    }

    log::info!("Moved to trash: {} -> {}", path.display(), target.display());
    Ok(target)
}

/// Create an empty placeholder at `target`, failing if anything is there.
fn reserve(target: &Path) -> Result<(), DeleteError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map(drop)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => DeleteError::Collision(target.to_path_buf()),
            _ => DeleteError::from_io(target, e),
        })
}

/// Fill the reserved `target` with the contents of `path`, then remove
/// `path`. On any failure the target is discarded and `path` is left alone.
fn copy_then_remove(path: &Path, target: &Path) -> Result<(), DeleteError> {
    let cross = |source| DeleteError::CrossDevice {
        path: path.to_path_buf(),
        source,
    };

    if let Err(e) = copy_into(path, target) {
        discard(target);
        return Err(cross(e));
    }
    if let Err(e) = fs::remove_file(path) {
        discard(target);
        return Err(cross(e));
    }
    Ok(())
}

fn copy_into(path: &Path, target: &Path) -> io::Result<()> {
    let mut source = File::open(path)?;
    let mut dest = OpenOptions::new().write(true).truncate(true).open(target)?;
    io::copy(&mut source, &mut dest)?;
    dest.sync_all()?;
    fs::set_permissions(target, source.metadata()?.permissions())
}

/// Remove a placeholder or partial copy from the trash.
fn discard(target: &Path) {
    if let Err(e) = fs::remove_file(target) {
        log::warn!("Could not remove {} from the trash: {}", target.display(), e);
    }
}

/// `<stem>_<unix-nanos>.<ext>`, or `<stem>_<unix-nanos>` without an extension.
fn trash_name(path: &Path) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    match path.extension() {
        Some(ext) => format!("{stem}_{nanos}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{nanos}"),
    }
}

/// Apply `mode` to every victim in the report.
///
/// Keepers and hardlinks are never touched. Failures are logged and
/// collected; the batch continues.
#[must_use]
pub fn apply(report: &Report, mode: ActionMode, trash_dir: &Path) -> BatchResult {
    let mut result = BatchResult::default();

    for victim in report.victims() {
        let outcome = match mode {
            ActionMode::Delete => permanent_delete(&victim.path),
            ActionMode::Trash => move_to_trash_dir(&victim.path, trash_dir).map(|_| ()),
        };

        match outcome {
            Ok(()) => {
                result.bytes_freed += victim.size;
                result.succeeded.push(victim.path.clone());
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", victim.path.display(), e);
                result.failed.push((victim.path.clone(), e));
            }
        }
    }

    log::info!(
        "Action finished: {} succeeded, {} failed",
        result.succeeded.len(),
        result.failed.len()
    );
    result
}
