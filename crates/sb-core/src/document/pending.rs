use crate::capture::CapturedImage;

/// The tail of the document that has not reached disk yet: the most recent
/// captured image, its caption, and how many trailing blocks the unsaved
/// content occupies.
///
/// Merges splice external content in front of this span so user-authored
/// blocks stay at the end of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub image: CapturedImage,
    pub caption: Option<String>,
    pub block_span: usize,
}

impl PendingEdit {
    pub fn new(image: CapturedImage, caption: Option<String>) -> Self {
        let block_span = 1 + usize::from(caption.is_some());
        Self {
            image,
            caption,
            block_span,
        }
    }

    /// Fold an older unsaved span into this edit, e.g. when a second capture
    /// lands before a cancelled save ever completed.
    pub fn widened_by(mut self, extra_blocks: usize) -> Self {
        self.block_span += extra_blocks;
        self
    }
}
