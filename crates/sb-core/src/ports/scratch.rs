use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

/// Port for the process-wide scratch directory holding transient capture
/// artifacts. Everything here is disposable; `purge` runs at shutdown.
pub trait ScratchPort: Send + Sync {
    /// Write `bytes` to a fresh scratch file named after `stem` and `ext`,
    /// returning its path.
    fn spill(&self, stem: &str, ext: &str, bytes: &Bytes) -> io::Result<PathBuf>;

    fn read(&self, path: &Path) -> io::Result<Bytes>;

    /// Best-effort removal of one scratch file.
    fn discard(&self, path: &Path);

    /// Best-effort removal of the whole scratch directory.
    fn purge(&self);
}
