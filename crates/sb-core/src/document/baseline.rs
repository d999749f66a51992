use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::Block;
use crate::ids::AttachmentId;

/// What the document looked like at the last successful load or save.
///
/// Conflict merges diff the external file against this snapshot, so it must
/// only ever be refreshed at a moment when memory and disk are known to
/// agree. `Document::mark_saved` is the one place that does so.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    paragraph_count: usize,
    paragraph_texts: Vec<String>,
    attachment_count: usize,
    attachment_ids: BTreeSet<AttachmentId>,
}

impl BaselineSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot an in-memory block list.
    pub fn of_blocks(blocks: &[Block]) -> Self {
        let paragraph_texts: Vec<String> = blocks
            .iter()
            .filter_map(Block::as_paragraph)
            .map(|p| p.text())
            .collect();
        let attachment_ids: BTreeSet<AttachmentId> = blocks
            .iter()
            .filter_map(Block::as_image)
            .map(|img| img.id.clone())
            .collect();
        Self {
            paragraph_count: paragraph_texts.len(),
            attachment_count: attachment_ids.len(),
            paragraph_texts,
            attachment_ids,
        }
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraph_count
    }

    pub fn paragraph_texts(&self) -> &[String] {
        &self.paragraph_texts
    }

    pub fn attachment_count(&self) -> usize {
        self.attachment_count
    }

    pub fn attachment_ids(&self) -> &BTreeSet<AttachmentId> {
        &self.attachment_ids
    }

    pub fn contains_attachment(&self, id: &AttachmentId) -> bool {
        self.attachment_ids.contains(id)
    }
}
