//! Atomic file replacement via same-directory temp file + rename.
//!
//! The destination is only ever touched by the final rename, which the OS
//! performs as a single directory-entry update. Readers of the destination
//! therefore see either the complete old content or the complete new content.
//!
//! Concurrent calls against the same destination are not serialized: each
//! call has its own temp file and the last rename wins.

use std::ffi::{OsStr, OsString};
use std::fs::{self, File, Permissions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::error::{ReplaceError, ReplaceResult};

/// Result of inspecting the destination before the rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeProbe {
    /// Destination exists; its permissions are carried over.
    Found(Permissions),
    /// No original file. The temp file keeps its creation mode.
    NotFound,
}

/// Atomically replace `path` with everything read from `content`.
///
/// A uniquely named temp file is created next to `path`, filled from
/// `content` until EOF, given the permissions of the existing destination
/// (if any), then renamed over `path`.
///
/// # Errors
///
/// Returns a [`ReplaceError`] naming the phase that failed. On every error
/// the destination is unchanged and the temp file has been removed.
pub fn atomic_replace<P, R>(path: P, content: R) -> ReplaceResult<()>
where
    P: AsRef<Path>,
    R: Read,
{
    let path = path.as_ref();
    let (dir, name) = split_destination(path)?;

    let (handle, temp) = create_temp(dir, name)?.into_parts();
    debug!(path = %path.display(), temp = %temp.display(), "created temp file");

    let staged = write_and_close(handle, content, &temp).and_then(|()| copy_mode(path, &temp));
    if let Err(err) = staged {
        discard(temp);
        return Err(err);
    }

    install(temp, path)
}

/// Atomically replace `path` with an in-memory buffer.
///
/// # Errors
///
/// Same as [`atomic_replace`].
pub fn atomic_write<P, C>(path: P, content: C) -> ReplaceResult<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    atomic_replace(path, content.as_ref())
}

/// Look up the current permissions of `path`.
///
/// A missing file is the expected first-write case and is reported as
/// [`ModeProbe::NotFound`], not as an error.
///
/// # Errors
///
/// Returns [`ReplaceError::StatFailed`] for any other stat failure.
pub fn probe_mode(path: &Path) -> ReplaceResult<ModeProbe> {
    match fs::metadata(path) {
        Ok(meta) => Ok(ModeProbe::Found(meta.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ModeProbe::NotFound),
        Err(source) => Err(ReplaceError::StatFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Split into (directory, file name). An empty directory means the cwd.
fn split_destination(path: &Path) -> ReplaceResult<(&Path, &OsStr)> {
    let name = path
        .file_name()
        .ok_or_else(|| ReplaceError::InvalidDestination {
            path: path.to_path_buf(),
        })?;

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    Ok((dir, name))
}

/// Temp names look like `.<name>.XXXXXX.tmp` so they never match the
/// destination's own naming pattern.
fn create_temp(dir: &Path, name: &OsStr) -> ReplaceResult<tempfile::NamedTempFile> {
    let mut prefix = OsString::from(".");
    prefix.push(name);
    prefix.push(".");

    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|source| ReplaceError::CreateFailed {
            dir: dir.to_path_buf(),
            source,
        })
}

/// Drain `content` into the temp file, sync it, then drop the handle.
///
/// `File` swallows close(2) errors on drop. Deferred write errors are only
/// caught by the sync, which is reported as the close phase.
fn write_and_close<R: Read>(mut handle: File, mut content: R, temp: &Path) -> ReplaceResult<()> {
    let written = io::copy(&mut content, &mut handle).map_err(|source| {
        ReplaceError::WriteFailed {
            temp: temp.to_path_buf(),
            source,
        }
    })?;

    let finalized = handle.sync_all();
    drop(handle);
    finalized.map_err(|source| ReplaceError::CloseFailed {
        temp: temp.to_path_buf(),
        source,
    })?;

    debug!(temp = %temp.display(), bytes = written, "temp file written");
    Ok(())
}

fn copy_mode(path: &Path, temp: &Path) -> ReplaceResult<()> {
    match probe_mode(path)? {
        ModeProbe::Found(perms) => {
            fs::set_permissions(temp, perms).map_err(|source| ReplaceError::ModeApplyFailed {
                temp: temp.to_path_buf(),
                source,
            })
        }
        ModeProbe::NotFound => {
            debug!(path = %path.display(), "no original file, keeping default mode");
            Ok(())
        }
    }
}

/// Rename the temp file over `path`. No copy fallback on cross-device errors.
fn install(temp: TempPath, path: &Path) -> ReplaceResult<()> {
    match temp.persist(path) {
        Ok(()) => {
            debug!(path = %path.display(), "replaced");
            Ok(())
        }
        Err(err) => {
            let temp_name: PathBuf = err.path.to_path_buf();
            discard(err.path);
            Err(ReplaceError::RenameFailed {
                path: path.to_path_buf(),
                temp: temp_name,
                source: err.error,
            })
        }
    }
}

/// Remove a temp file on an error path. Never masks the caller's error.
fn discard(temp: TempPath) {
    let shown = temp.to_path_buf();
    if let Err(e) = temp.close() {
        warn!(temp = %shown.display(), error = %e, "failed to remove temp file");
    }
}
