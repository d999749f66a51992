//! The document store: open/create, append captures, and the conflict-aware
//! save path.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use sb_core::decision::{CloseChoice, ConflictChoice, MergeFailureChoice};
use sb_core::error::DocumentError;
use sb_core::merge::{self, MergePlan};
use sb_core::ports::{
    ClockPort, DialogPort, FilesystemPort, PackageError, PackagePort, RelationshipKind,
    ScratchPort,
};
use sb_core::{CapturedImage, Document, ImageBlock, SavePhase};

use crate::transaction::PersistenceTransaction;

/// What a save attempt amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The document reached disk; `merged` says whether external content
    /// was folded in on the way.
    Saved { merged: bool },
    /// The user backed out at a conflict or merge-failure prompt. The
    /// in-memory document keeps its unsaved content.
    Cancelled,
    /// A save was already in flight; exactly one follow-up runs after it.
    Queued,
}

/// What closing the document amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Saved,
    Discarded,
    /// Nothing was dirty; closed silently.
    Clean,
    /// The user cancelled; the document stays open.
    KeptOpen,
}

/// Owns the one open document and every port the save path needs.
pub struct DocumentStore {
    package: Arc<dyn PackagePort>,
    fs: Arc<dyn FilesystemPort>,
    scratch: Arc<dyn ScratchPort>,
    dialogs: Arc<dyn DialogPort>,
    clock: Arc<dyn ClockPort>,
    document: Option<Document>,
    phase: SavePhase,
    save_in_flight: bool,
    save_queued: bool,
}

impl DocumentStore {
    pub fn new(
        package: Arc<dyn PackagePort>,
        fs: Arc<dyn FilesystemPort>,
        scratch: Arc<dyn ScratchPort>,
        dialogs: Arc<dyn DialogPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            package,
            fs,
            scratch,
            dialogs,
            clock,
            document: None,
            phase: SavePhase::default(),
            save_in_flight: false,
            save_queued: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.document.as_ref().map(Document::path)
    }

    /// Phase the most recent save attempt ended in.
    pub fn phase(&self) -> SavePhase {
        self.phase
    }

    /// Create a fresh document at `path`, seed its header and persist it.
    pub fn create(&mut self, path: impl Into<PathBuf>, title: &str) -> Result<(), DocumentError> {
        let path = path.into();
        let span = info_span!("store.document.create", path = %path.display());
        let _guard = span.enter();

        let mut doc = Document::new(&path);
        doc.push_paragraph(title);
        doc.push_paragraph(format!(
            "Created at {}",
            self.clock.now().format("%Y-%m-%d %H:%M:%S")
        ));
        self.phase = SavePhase::default();
        self.persist(&mut doc)?;
        info!("Document created");
        self.document = Some(doc);
        Ok(())
    }

    /// Open an existing package and take its baseline.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), DocumentError> {
        let path = path.into();
        let span = info_span!("store.document.open", path = %path.display());
        let _guard = span.enter();

        let snapshot = self.package.load(&path).map_err(map_open_error)?;
        let mtime = self.fs.modified_time(&path)?;
        let doc = Document::from_persisted(path, snapshot.blocks, mtime);
        info!(blocks = doc.blocks().len(), "Document opened");
        self.document = Some(doc);
        self.phase = SavePhase::default();
        Ok(())
    }

    /// Stage a captured image (plus optional caption) and run the save path.
    pub fn append_capture(
        &mut self,
        image: CapturedImage,
        caption: Option<String>,
    ) -> Result<SaveOutcome, DocumentError> {
        let doc = self.document.as_mut().ok_or(DocumentError::NoDocument)?;
        doc.stage_capture(image, caption);
        self.save()
    }

    /// Persist the open document, detecting and reconciling external edits.
    ///
    /// Non-reentrant: a save arriving while one is in flight parks as
    /// `Queued`, and exactly one follow-up attempt runs once the active one
    /// succeeds.
    pub fn save(&mut self) -> Result<SaveOutcome, DocumentError> {
        if self.save_in_flight {
            debug!("Save already in flight, queueing one follow-up");
            self.save_queued = true;
            return Ok(SaveOutcome::Queued);
        }
        self.save_in_flight = true;
        let mut outcome = self.save_once();
        while matches!(outcome, Ok(SaveOutcome::Saved { .. })) && self.save_queued {
            self.save_queued = false;
            outcome = self.save_once();
        }
        self.save_queued = false;
        self.save_in_flight = false;
        outcome
    }

    /// Close the open document. With `ask_save`, unsaved content goes
    /// through the close confirmation; without it, it is dropped.
    pub fn close(&mut self, ask_save: bool) -> Result<CloseOutcome, DocumentError> {
        let dirty = match self.document.as_ref() {
            None => return Ok(CloseOutcome::Clean),
            Some(doc) => doc.is_dirty(),
        };
        if !dirty {
            self.document = None;
            return Ok(CloseOutcome::Clean);
        }
        if !ask_save {
            warn!("Closing without prompt, unsaved changes dropped");
            self.document = None;
            return Ok(CloseOutcome::Discarded);
        }

        match self.dialogs.present_close_confirmation() {
            CloseChoice::Cancel => Ok(CloseOutcome::KeptOpen),
            CloseChoice::Discard => {
                warn!("Discarding unsaved changes at close");
                self.document = None;
                Ok(CloseOutcome::Discarded)
            }
            CloseChoice::Save => match self.save() {
                Ok(SaveOutcome::Saved { .. }) => {
                    self.document = None;
                    Ok(CloseOutcome::Saved)
                }
                Ok(SaveOutcome::Cancelled) | Ok(SaveOutcome::Queued) => Ok(CloseOutcome::KeptOpen),
                Err(err) => {
                    warn!("Save during close failed: {err}");
                    if self.dialogs.confirm_discard_after_failure(&err.to_string()) {
                        self.document = None;
                        Ok(CloseOutcome::Discarded)
                    } else {
                        Err(err)
                    }
                }
            },
        }
    }

    fn save_once(&mut self) -> Result<SaveOutcome, DocumentError> {
        // The document leaves its slot for the duration so the ports can be
        // used alongside a mutable borrow of it.
        let mut doc = self.document.take().ok_or(DocumentError::NoDocument)?;
        let result = self.save_document(&mut doc);
        self.document = Some(doc);
        result
    }

    fn save_document(&mut self, doc: &mut Document) -> Result<SaveOutcome, DocumentError> {
        let span = info_span!("store.document.save", path = %doc.path().display());
        let _guard = span.enter();
        self.phase = SavePhase::default();

        let conflicted = match doc.last_known_mtime() {
            None => false,
            Some(known) => match self.fs.modified_time(doc.path())? {
                None => {
                    warn!("Backing file disappeared; recreating it on save");
                    false
                }
                Some(current) => current != known,
            },
        };

        if !conflicted {
            self.persist(doc)?;
            return Ok(SaveOutcome::Saved { merged: false });
        }

        self.phase = self.phase.on_conflict().unwrap_or(self.phase);
        info!("External modification detected");
        match self.dialogs.present_conflict() {
            ConflictChoice::Cancel => {
                info!("Save cancelled at conflict prompt");
                self.phase = self.phase.fail();
                Ok(SaveOutcome::Cancelled)
            }
            ConflictChoice::Overwrite => {
                warn!("Overwriting external modification at user request");
                self.persist(doc)?;
                Ok(SaveOutcome::Saved { merged: false })
            }
            ConflictChoice::Merge => {
                self.phase = self.phase.start_merge().unwrap_or(self.phase);
                match self.merge_external(doc) {
                    Ok(merged_doc) => {
                        *doc = merged_doc;
                        self.persist(doc)?;
                        Ok(SaveOutcome::Saved { merged: true })
                    }
                    Err(err) => {
                        let reason = err.to_string();
                        warn!(%reason, "Merge failed");
                        match self.dialogs.present_merge_failure(&reason) {
                            MergeFailureChoice::Overwrite => {
                                // The merge worked on a clone, so `doc` is
                                // still the pre-conflict document.
                                warn!("Falling back to overwrite after failed merge");
                                self.persist(doc)?;
                                Ok(SaveOutcome::Saved { merged: false })
                            }
                            MergeFailureChoice::Cancel => {
                                self.phase = self.phase.fail();
                                Ok(SaveOutcome::Cancelled)
                            }
                        }
                    }
                }
            }
        }
    }

    /// Build the merged document on a clone; the caller only adopts it when
    /// every step succeeded.
    fn merge_external(&self, doc: &Document) -> Result<Document, DocumentError> {
        let external = self
            .package
            .load(doc.path())
            .map_err(|e| DocumentError::Merge(format!("external file unreadable: {e}")))?;

        let MergePlan {
            strategy,
            incoming_images,
        } = merge::plan_merge(doc.baseline(), &external);

        // Each incoming attachment passes through the scratch directory as a
        // real file before the document adopts its bytes.
        let mut imported = Vec::with_capacity(incoming_images.len());
        for rel in incoming_images {
            let RelationshipKind::Image { ext } = rel.kind else {
                continue;
            };
            let spilled = self
                .scratch
                .spill(&format!("merge_{}", rel.id), &ext, &rel.bytes)
                .map_err(|e| DocumentError::Merge(format!("scratch spill failed: {e}")))?;
            let bytes = self
                .scratch
                .read(&spilled)
                .map_err(|e| DocumentError::Merge(format!("scratch read-back failed: {e}")))?;
            self.scratch.discard(&spilled);
            imported.push(ImageBlock::with_id(rel.id, bytes, ext));
        }

        let mut merged = doc.clone();
        merge::apply_plan(&mut merged, strategy, imported);
        debug!(blocks = merged.blocks().len(), "Merge applied");
        Ok(merged)
    }

    /// Run the write transaction and refresh the document's bookkeeping.
    fn persist(&mut self, doc: &mut Document) -> Result<(), DocumentError> {
        if let Some(parent) = doc.path().parent() {
            if !parent.as_os_str().is_empty() && !self.fs.exists(parent) {
                self.phase = self.phase.fail();
                return Err(DocumentError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("document directory missing: {}", parent.display()),
                )));
            }
        }

        let tx = PersistenceTransaction::new(self.fs.as_ref(), doc.path());
        let result = tx.commit(|tmp| self.package.write(doc, tmp));
        match result {
            Ok(()) => {
                let mtime = self.fs.modified_time(doc.path())?.ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "persisted file vanished before stat")
                })?;
                doc.mark_saved(mtime);
                self.phase = self.phase.on_persisted(true);
                info!(blocks = doc.blocks().len(), "Document persisted");
                Ok(())
            }
            Err(err) => {
                self.phase = self.phase.on_persisted(false);
                if err.restored {
                    warn!(backup = ?err.backup, "Save failed; target restored from its backup");
                } else {
                    warn!(backup = ?err.backup, "Save failed without restore");
                }
                Err(err.into())
            }
        }
    }
}

fn map_open_error(err: PackageError) -> DocumentError {
    match err {
        PackageError::Io(io) => DocumentError::Io(io),
        other => DocumentError::Format(other),
    }
}
