use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Port over the handful of filesystem operations the save path needs.
///
/// Narrow on purpose: the write transaction is expressed entirely in these
/// verbs, which keeps its failure handling testable without touching disk.
pub trait FilesystemPort: Send + Sync {
    /// Modification time of `path`, or `None` when the file does not exist.
    fn modified_time(&self, path: &Path) -> io::Result<Option<SystemTime>>;

    fn exists(&self, path: &Path) -> bool;

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Atomic within a filesystem, replacing `to` when it exists.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}
