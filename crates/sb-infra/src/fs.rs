use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use sb_core::ports::FilesystemPort;

/// Straight passthrough to `std::fs`. A missing file is a regular answer
/// for `modified_time`, not an error, because the save path treats it as
/// "target vanished, recreate it".
pub struct StdFilesystem;

impl FilesystemPort for StdFilesystem {
    fn modified_time(&self, path: &Path) -> io::Result<Option<SystemTime>> {
        match fs::metadata(path) {
            Ok(meta) => meta.modified().map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::copy(from, to).map(|_| ())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        // TODO: Windows 上覆盖已存在的目标需要 ReplaceFileW；macOS/Linux OK。
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
