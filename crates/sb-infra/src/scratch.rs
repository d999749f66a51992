use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use sb_core::ports::ScratchPort;

const SCRATCH_DIR_NAME: &str = "snapbook";

/// One process-wide directory for transient capture artifacts. Created
/// lazily on first spill, purged best-effort at shutdown.
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The conventional location under the OS temp dir.
    pub fn in_os_temp() -> Self {
        Self::new(env::temp_dir().join(SCRATCH_DIR_NAME))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }
}

impl ScratchPort for ScratchDir {
    fn spill(&self, stem: &str, ext: &str, bytes: &Bytes) -> io::Result<PathBuf> {
        self.ensure_root()?;
        let path = self.root.join(format!("{stem}.{ext}"));
        fs::write(&path, bytes)?;
        log::debug!("scratch file written: {}", path.display());
        Ok(path)
    }

    fn read(&self, path: &Path) -> io::Result<Bytes> {
        fs::read(path).map(Bytes::from)
    }

    fn discard(&self, path: &Path) {
        if let Err(err) = fs::remove_file(path) {
            log::warn!("scratch discard failed for {}: {err}", path.display());
        }
    }

    fn purge(&self) {
        if !self.root.exists() {
            return;
        }
        match fs::remove_dir_all(&self.root) {
            Ok(()) => log::debug!("scratch dir purged: {}", self.root.display()),
            Err(err) => log::warn!("scratch purge failed for {}: {err}", self.root.display()),
        }
    }
}
