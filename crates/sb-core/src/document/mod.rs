//! The in-memory document: an ordered block list plus the bookkeeping needed
//! to detect and merge concurrent edits of the backing file.

mod baseline;
mod block;
mod pending;

pub use baseline::BaselineSnapshot;
pub use block::{Block, ImageBlock, Paragraph, TextRun};
pub use pending::PendingEdit;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::capture::CapturedImage;
use crate::ids::AttachmentId;

/// One open document and everything the save path needs to know about it.
///
/// The struct is deliberately passive: it validates and records, while the
/// application layer decides when to capture, merge and persist.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    blocks: Vec<Block>,
    baseline: BaselineSnapshot,
    last_known_mtime: Option<SystemTime>,
    pending: Option<PendingEdit>,
    dirty: bool,
}

impl Document {
    /// A new, never-persisted document.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            blocks: Vec::new(),
            baseline: BaselineSnapshot::empty(),
            last_known_mtime: None,
            pending: None,
            dirty: false,
        }
    }

    /// A document reconstructed from its persisted blocks. The baseline is
    /// taken from those blocks and `mtime` becomes the conflict reference.
    pub fn from_persisted(
        path: impl Into<PathBuf>,
        blocks: Vec<Block>,
        mtime: Option<SystemTime>,
    ) -> Self {
        let baseline = BaselineSnapshot::of_blocks(&blocks);
        Self {
            path: path.into(),
            blocks,
            baseline,
            last_known_mtime: mtime,
            pending: None,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn baseline(&self) -> &BaselineSnapshot {
        &self.baseline
    }

    pub fn last_known_mtime(&self) -> Option<SystemTime> {
        self.last_known_mtime
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        self.pending.as_ref()
    }

    /// Unsaved changes of any kind, staged capture or merged content.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn paragraph_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.as_paragraph().is_some())
            .count()
    }

    pub fn attachment_ids(&self) -> impl Iterator<Item = &AttachmentId> {
        self.blocks.iter().filter_map(Block::as_image).map(|i| &i.id)
    }

    /// Append a plain paragraph (titles, headers, free-standing notes).
    pub fn push_paragraph(&mut self, text: impl Into<String>) {
        self.blocks.push(Block::plain_text(text));
        self.dirty = true;
    }

    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
        self.dirty = true;
    }

    /// Stage a captured image, with an optional caption paragraph ahead of
    /// it, as the pending edit. An earlier pending span that never reached
    /// disk is folded into the new one rather than silently dropped.
    pub fn stage_capture(&mut self, image: CapturedImage, caption: Option<String>) {
        let carried = self.pending.take().map(|p| p.block_span).unwrap_or(0);
        if let Some(text) = &caption {
            self.blocks.push(Block::plain_text(text.clone()));
        }
        self.blocks.push(Block::Image(ImageBlock::new(
            image.bytes.clone(),
            image.ext.clone(),
        )));
        self.pending = Some(PendingEdit::new(image, caption).widened_by(carried));
        self.dirty = true;
    }

    /// Number of trailing blocks owned by the pending edit.
    pub fn pending_span(&self) -> usize {
        self.pending.as_ref().map(|p| p.block_span).unwrap_or(0)
    }

    /// Index where merged external content is spliced in: right before the
    /// pending tail, or at the end when nothing is pending.
    pub fn merge_insert_at(&self) -> usize {
        self.blocks.len() - self.pending_span()
    }

    /// Insert external paragraphs ahead of the pending tail.
    pub fn splice_external_tail(&mut self, paragraphs: Vec<Paragraph>) {
        let at = self.merge_insert_at();
        self.blocks
            .splice(at..at, paragraphs.into_iter().map(Block::Text));
        self.dirty = true;
    }

    /// Replace everything but the pending tail with the external block list.
    pub fn rebase_onto(&mut self, external: Vec<Block>) {
        let tail = self.blocks.split_off(self.merge_insert_at());
        self.blocks = external;
        self.blocks.extend(tail);
        self.dirty = true;
    }

    /// Append attachments imported from a concurrent edit, in table order.
    pub fn append_merged_images(&mut self, images: Vec<ImageBlock>) {
        if images.is_empty() {
            return;
        }
        self.blocks.extend(images.into_iter().map(Block::Image));
        self.dirty = true;
    }

    /// Disk and memory agree again: refresh the baseline, clear the pending
    /// edit and record the new conflict reference mtime.
    pub fn mark_saved(&mut self, mtime: SystemTime) {
        self.baseline = BaselineSnapshot::of_blocks(&self.blocks);
        self.last_known_mtime = Some(mtime);
        self.pending = None;
        self.dirty = false;
    }
}
