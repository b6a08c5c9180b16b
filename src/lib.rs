//! `atomic-replace` -- all-or-nothing file replacement.
//!
//! Writes a byte stream to a temp file in the destination's directory, copies
//! the destination's permissions onto it, then renames it into place. No
//! reader ever observes a partially written destination, and a failed call
//! leaves the original file (or its absence) untouched with no temp file
//! left behind.
//!
//! # Flow
//!
//! ```text
//! path, stream → create temp (same dir) → copy stream → close
//!              → stat destination → chmod temp → rename temp → path
//! ```
//!
//! There is no locking: concurrent callers targeting the same path race at
//! the rename and the last one wins.

pub mod error;
pub mod replace;

pub use error::{ReplaceError, ReplaceErrorKind, ReplaceResult};
pub use replace::{ModeProbe, atomic_replace, atomic_write, probe_mode};
