//! End-to-end save scenarios against the real filesystem adapters: create,
//! append, reload, and conflict merges driven by an out-of-band writer.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use bytes::Bytes;

use sb_app::{DocumentStore, SaveOutcome};
use sb_core::decision::{CaptionDecision, CloseChoice, ConflictChoice, MergeFailureChoice};
use sb_core::ports::{DialogPort, PackagePort};
use sb_core::{Block, CapturedImage, Document, ImageBlock, Region};
use sb_infra::{JsonPackage, ScratchDir, StdFilesystem, SystemClock};

/// Dialog collaborator answering conflict prompts from a script and
/// counting how often it was consulted.
struct ScriptedDialogs {
    conflicts: Mutex<VecDeque<ConflictChoice>>,
    conflict_prompts: AtomicUsize,
}

impl ScriptedDialogs {
    fn new() -> Self {
        Self {
            conflicts: Mutex::new(VecDeque::new()),
            conflict_prompts: AtomicUsize::new(0),
        }
    }

    fn script_conflict(&self, choice: ConflictChoice) {
        self.conflicts.lock().expect("lock").push_back(choice);
    }

    fn conflict_prompts(&self) -> usize {
        self.conflict_prompts.load(Ordering::SeqCst)
    }
}

impl DialogPort for ScriptedDialogs {
    fn present_for_caption(&self, _image: &CapturedImage) -> CaptionDecision {
        CaptionDecision::discard()
    }

    fn select_region(&self) -> Option<Region> {
        None
    }

    fn present_conflict(&self) -> ConflictChoice {
        self.conflict_prompts.fetch_add(1, Ordering::SeqCst);
        self.conflicts
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(ConflictChoice::Cancel)
    }

    fn present_merge_failure(&self, _reason: &str) -> MergeFailureChoice {
        MergeFailureChoice::Cancel
    }

    fn present_close_confirmation(&self) -> CloseChoice {
        CloseChoice::Cancel
    }

    fn confirm_discard_after_failure(&self, _reason: &str) -> bool {
        false
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    doc_path: PathBuf,
    scratch_root: PathBuf,
    dialogs: Arc<ScriptedDialogs>,
    store: DocumentStore,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let doc_path = dir.path().join("notes.sbk");
    let scratch_root = dir.path().join("scratch");
    let dialogs = Arc::new(ScriptedDialogs::new());
    let store = DocumentStore::new(
        Arc::new(JsonPackage::default()),
        Arc::new(StdFilesystem),
        Arc::new(ScratchDir::new(&scratch_root)),
        dialogs.clone(),
        Arc::new(SystemClock),
    );
    Harness {
        _dir: dir,
        doc_path,
        scratch_root,
        dialogs,
        store,
    }
}

fn reopened(harness: &Harness) -> DocumentStore {
    let mut store = DocumentStore::new(
        Arc::new(JsonPackage::default()),
        Arc::new(StdFilesystem),
        Arc::new(ScratchDir::new(&harness.scratch_root)),
        Arc::new(ScriptedDialogs::new()),
        Arc::new(SystemClock),
    );
    store.open(&harness.doc_path).expect("reopen");
    store
}

fn capture(payload: &'static [u8]) -> CapturedImage {
    CapturedImage::png(Bytes::from_static(payload), 64, 64)
}

fn paragraph_texts(doc: &Document) -> Vec<String> {
    doc.blocks()
        .iter()
        .filter_map(Block::as_paragraph)
        .map(|p| p.text())
        .collect()
}

/// Write to the document file the way another process would: straight
/// through the codec, no transaction, after a pause so the mtime moves.
fn external_write(path: &Path, mutate: impl FnOnce(&mut Document)) {
    thread::sleep(Duration::from_millis(20));
    let codec = JsonPackage::default();
    let snapshot = codec.load(path).expect("external load");
    let mut doc = Document::from_persisted(path, snapshot.blocks, None);
    mutate(&mut doc);
    codec.write(&doc, path).expect("external write");
}

#[test]
fn scenario_create_append_reload() {
    let mut h = harness();
    h.store.create(&h.doc_path, "Capture log").expect("create");

    let outcome = h
        .store
        .append_capture(capture(b"\x89PNG scenario-a"), Some("A".into()))
        .expect("append");
    assert_eq!(outcome, SaveOutcome::Saved { merged: false });

    let reloaded = reopened(&h);
    let doc = reloaded.document().expect("open document");
    let blocks = doc.blocks();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[0].as_paragraph().expect("title").text(), "Capture log");
    assert!(blocks[1]
        .as_paragraph()
        .expect("header")
        .text()
        .starts_with("Created at "));
    assert_eq!(blocks[2].as_paragraph().expect("caption").text(), "A");
    let image = blocks[3].as_image().expect("image");
    assert_eq!(image.bytes, Bytes::from_static(b"\x89PNG scenario-a"));
    assert_eq!(image.ext, "png");
    // No conflicts on a quiet file.
    assert_eq!(h.dialogs.conflict_prompts(), 0);
}

#[test]
fn scenario_merge_keeps_external_paragraph_ahead_of_local_content() {
    let mut h = harness();
    h.store.create(&h.doc_path, "Field log").expect("create");

    external_write(&h.doc_path, |doc| doc.push_paragraph("X"));

    h.dialogs.script_conflict(ConflictChoice::Merge);
    let outcome = h
        .store
        .append_capture(capture(b"\x89PNG scenario-b"), Some("B".into()))
        .expect("append");

    assert_eq!(outcome, SaveOutcome::Saved { merged: true });
    assert_eq!(h.dialogs.conflict_prompts(), 1);

    let reloaded = reopened(&h);
    let doc = reloaded.document().expect("open document");
    let texts = paragraph_texts(doc);
    assert_eq!(texts.len(), 4);
    assert_eq!(texts[0], "Field log");
    assert_eq!(texts[2], "X");
    assert_eq!(texts[3], "B");
    assert!(doc.blocks().last().expect("last block").as_image().is_some());

    // The pre-merge disk copy was kept as a backup sibling.
    let backup = PathBuf::from(format!("{}.bak", h.doc_path.display()));
    assert!(backup.exists());
}

#[test]
fn merge_imports_external_attachments_through_scratch() {
    let mut h = harness();
    h.store.create(&h.doc_path, "Gallery").expect("create");

    let external_image = ImageBlock::new(Bytes::from_static(b"\x89PNG external"), "png");
    let external_id = external_image.id.clone();
    external_write(&h.doc_path, |doc| {
        doc.push_paragraph("gallery note");
        doc.push_block(Block::Image(external_image.clone()));
    });

    h.dialogs.script_conflict(ConflictChoice::Merge);
    let outcome = h
        .store
        .append_capture(capture(b"\x89PNG mine"), Some("mine".into()))
        .expect("append");
    assert_eq!(outcome, SaveOutcome::Saved { merged: true });

    let doc = h.store.document().expect("document");
    // External id survives the import, so a later diff will not re-import.
    assert!(doc.baseline().contains_attachment(&external_id));
    assert_eq!(doc.baseline().attachment_count(), 2);
    let last = doc.blocks().last().expect("last").as_image().expect("image");
    assert_eq!(last.id, external_id);
    assert_eq!(last.bytes, Bytes::from_static(b"\x89PNG external"));

    // The scratch pass-through cleaned up after itself.
    let leftovers: Vec<_> = fs::read_dir(&h.scratch_root)
        .map(|entries| entries.filter_map(Result::ok).collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty());

    // And the merged result is what a fresh reader sees.
    let reloaded = reopened(&h);
    let doc = reloaded.document().expect("document");
    let texts = paragraph_texts(doc);
    assert_eq!(texts.len(), 4);
    assert_eq!(texts[2], "gallery note");
    assert_eq!(texts[3], "mine");
    assert_eq!(doc.attachment_ids().count(), 2);
}

#[test]
fn saving_twice_without_changes_is_idempotent() {
    let mut h = harness();
    h.store.create(&h.doc_path, "Stable").expect("create");
    h.store
        .append_capture(capture(b"\x89PNG stable"), Some("once".into()))
        .expect("append");

    let baseline_before = h.store.document().expect("doc").baseline().clone();
    let bytes_before = fs::read(&h.doc_path).expect("read");

    let outcome = h.store.save().expect("second save");

    assert_eq!(outcome, SaveOutcome::Saved { merged: false });
    assert_eq!(h.store.document().expect("doc").baseline(), &baseline_before);
    assert_eq!(fs::read(&h.doc_path).expect("read"), bytes_before);
    assert_eq!(h.dialogs.conflict_prompts(), 0);
}

#[test]
fn conflict_cancel_leaves_disk_copy_alone() {
    let mut h = harness();
    h.store.create(&h.doc_path, "Held back").expect("create");

    external_write(&h.doc_path, |doc| doc.push_paragraph("theirs"));
    let disk_before = fs::read(&h.doc_path).expect("read");

    h.dialogs.script_conflict(ConflictChoice::Cancel);
    let outcome = h
        .store
        .append_capture(capture(b"\x89PNG held"), None)
        .expect("append");

    assert_eq!(outcome, SaveOutcome::Cancelled);
    assert_eq!(fs::read(&h.doc_path).expect("read"), disk_before);
    // The staged capture is still waiting for a retry.
    assert!(h.store.document().expect("doc").pending().is_some());
}

#[test]
fn opening_a_garbage_file_reports_format_error() {
    let h = harness();
    fs::write(&h.doc_path, b"this is not a package").expect("write");

    let mut store = DocumentStore::new(
        Arc::new(JsonPackage::default()),
        Arc::new(StdFilesystem),
        Arc::new(ScratchDir::new(&h.scratch_root)),
        Arc::new(ScriptedDialogs::new()),
        Arc::new(SystemClock),
    );
    let err = store.open(&h.doc_path).expect_err("open must fail");
    assert!(matches!(err, sb_core::DocumentError::Format(_)));
}
