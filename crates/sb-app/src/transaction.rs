//! The atomic persistence transaction: temp write, backup, rename, recover.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use sb_core::error::{TransactionError, TransactionPhase};
use sb_core::ports::{FilesystemPort, PackageError};

/// One attempt to swap a freshly encoded package into place without ever
/// leaving the target half-written.
///
/// Sequence: encode into `<target>.tmp`, best-effort copy the current file
/// to `<target>.bak`, then atomically rename the temp file over the target.
/// A failed rename removes the orphan temp file and copies the backup back;
/// the backup itself is always retained for manual recovery.
pub struct PersistenceTransaction<'a> {
    fs: &'a dyn FilesystemPort,
    target: &'a Path,
}

impl<'a> PersistenceTransaction<'a> {
    pub fn new(fs: &'a dyn FilesystemPort, target: &'a Path) -> Self {
        Self { fs, target }
    }

    pub fn temp_path(&self) -> PathBuf {
        sibling(self.target, "tmp")
    }

    pub fn backup_path(&self) -> PathBuf {
        sibling(self.target, "bak")
    }

    /// Run the transaction. `write` encodes the document into the path it
    /// is handed, which is always the temp sibling, never the target.
    pub fn commit<F>(self, write: F) -> Result<(), TransactionError>
    where
        F: FnOnce(&Path) -> Result<(), PackageError>,
    {
        let tmp = self.temp_path();
        let bak = self.backup_path();

        if let Err(err) = write(&tmp) {
            if self.fs.exists(&tmp) {
                if let Err(cleanup) = self.fs.remove_file(&tmp) {
                    warn!(
                        "Failed to remove orphan temp file {}: {}",
                        tmp.display(),
                        cleanup
                    );
                }
            }
            return Err(TransactionError {
                phase: TransactionPhase::TempWrite,
                cause: err.to_string(),
                restored: false,
                backup: None,
            });
        }

        let mut have_backup = false;
        if self.fs.exists(self.target) {
            match self.fs.copy(self.target, &bak) {
                Ok(()) => have_backup = true,
                Err(err) => warn!(
                    "Proceeding without backup of {}: {}",
                    self.target.display(),
                    err
                ),
            }
        }

        if let Err(err) = self.fs.rename(&tmp, self.target) {
            if let Err(cleanup) = self.fs.remove_file(&tmp) {
                warn!("Failed to remove temp file after rename failure: {cleanup}");
            }
            let (restored, backup) = if have_backup || self.fs.exists(&bak) {
                match self.fs.copy(&bak, self.target) {
                    Ok(()) => {
                        debug!("Restored {} from its backup", self.target.display());
                        (true, Some(bak))
                    }
                    Err(restore_err) => {
                        warn!(
                            "Failed to restore {} from backup: {}",
                            self.target.display(),
                            restore_err
                        );
                        (false, Some(bak))
                    }
                }
            } else {
                (false, None)
            };
            return Err(TransactionError {
                phase: TransactionPhase::Rename,
                cause: err.to_string(),
                restored,
                backup,
            });
        }

        Ok(())
    }
}

fn sibling(target: &Path, suffix: &str) -> PathBuf {
    // notes.sbk -> notes.sbk.tmp, so each document keeps its own pair.
    let mut name = target.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
