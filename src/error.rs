//! Error types for the atomic-replace crate.

use std::io;
use std::path::PathBuf;

/// Failure of a single replace call.
///
/// Every variant is terminal for the call that produced it. In all cases the
/// destination is left exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum ReplaceError {
    /// Destination has no final file-name component (`""`, `/`, `..`).
    #[error("invalid destination path: {path:?}")]
    InvalidDestination { path: PathBuf },

    /// Temp file could not be created in the destination directory.
    #[error("cannot create temp file in {dir}: {source}")]
    CreateFailed {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the content stream or writing the temp file failed.
    #[error("cannot write data to temp file {temp}: {source}")]
    WriteFailed {
        temp: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Finalizing the temp file failed.
    #[error("cannot close temp file {temp}: {source}")]
    CloseFailed {
        temp: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The destination exists (or may exist) but could not be inspected.
    #[error("cannot stat {path}: {source}")]
    StatFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The destination's permissions could not be copied onto the temp file.
    #[error("cannot set file mode on temp file {temp}: {source}")]
    ModeApplyFailed {
        temp: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The final rename onto the destination failed.
    #[error("cannot replace {path} with temp file {temp}: {source}")]
    RenameFailed {
        path: PathBuf,
        temp: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Phase of the replace protocol that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplaceErrorKind {
    InvalidDestination,
    CreateFailed,
    WriteFailed,
    CloseFailed,
    StatFailed,
    ModeApplyFailed,
    RenameFailed,
}

impl ReplaceError {
    /// The phase this error was raised in.
    #[must_use]
    pub const fn kind(&self) -> ReplaceErrorKind {
        match self {
            Self::InvalidDestination { .. } => ReplaceErrorKind::InvalidDestination,
            Self::CreateFailed { .. } => ReplaceErrorKind::CreateFailed,
            Self::WriteFailed { .. } => ReplaceErrorKind::WriteFailed,
            Self::CloseFailed { .. } => ReplaceErrorKind::CloseFailed,
            Self::StatFailed { .. } => ReplaceErrorKind::StatFailed,
            Self::ModeApplyFailed { .. } => ReplaceErrorKind::ModeApplyFailed,
            Self::RenameFailed { .. } => ReplaceErrorKind::RenameFailed,
        }
    }

    /// The underlying OS error, if the failure came from one.
    #[must_use]
    pub const fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::InvalidDestination { .. } => None,
            Self::CreateFailed { source, .. }
            | Self::WriteFailed { source, .. }
            | Self::CloseFailed { source, .. }
            | Self::StatFailed { source, .. }
            | Self::ModeApplyFailed { source, .. }
            | Self::RenameFailed { source, .. } => Some(source),
        }
    }
}

/// Convenience result type for replace operations.
pub type ReplaceResult<T> = Result<T, ReplaceError>;
