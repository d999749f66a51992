use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::ports::{CaptureError, PackageError};

/// Error taxonomy for every engine operation, grouped by what the caller
/// can do about it rather than by which layer raised it.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Filesystem trouble outside the write transaction (stat, preflight).
    #[error("document i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The package on disk cannot be decoded. Unrecoverable for that file.
    #[error("unreadable document package: {0}")]
    Format(#[source] PackageError),

    /// Conflict reconciliation gave up; the document is untouched and the
    /// caller may offer the overwrite fallback.
    #[error("merge failed: {0}")]
    Merge(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("no document is open")]
    NoDocument,
}

/// Where in the tmp-write / backup / rename sequence a save died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPhase {
    /// Writing the temp sibling; the target was never touched.
    TempWrite,
    /// Swapping the temp file into place; recovery ran.
    Rename,
}

impl fmt::Display for TransactionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionPhase::TempWrite => f.write_str("temp-write"),
            TransactionPhase::Rename => f.write_str("rename"),
        }
    }
}

/// A failed write transaction, with enough detail for the caller to tell
/// the user what survived.
#[derive(Debug, Error)]
#[error("save transaction failed during {phase}: {cause}")]
pub struct TransactionError {
    pub phase: TransactionPhase,
    pub cause: String,
    /// Whether the target was put back from its backup.
    pub restored: bool,
    /// The backup file consulted during recovery, retained on disk.
    pub backup: Option<PathBuf>,
}
