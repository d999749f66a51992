use crate::capture::{CapturedImage, Region};
use crate::decision::{CaptionDecision, CloseChoice, ConflictChoice, MergeFailureChoice};

/// Port for every user decision the engine needs.
///
/// Implementations own the presentation: a GUI would raise modal dialogs, a
/// console build prompts on stdin. Calls block until the user decides, which
/// is why the coordinator marks itself `DialogOpen` around them.
pub trait DialogPort: Send + Sync {
    /// Show the fresh capture and collect the caption, or a discard.
    fn present_for_caption(&self, image: &CapturedImage) -> CaptionDecision;

    /// Let the user pick the rectangle for a region capture. `None` or a
    /// zero-area region cancels the capture.
    fn select_region(&self) -> Option<Region>;

    /// The backing file changed since the last save.
    fn present_conflict(&self) -> ConflictChoice;

    /// Merging the external file failed; offer the fallback.
    fn present_merge_failure(&self, reason: &str) -> MergeFailureChoice;

    /// Unsaved content at close time.
    fn present_close_confirmation(&self) -> CloseChoice;

    /// Saving failed during close; last chance to keep the process alive.
    fn confirm_discard_after_failure(&self, reason: &str) -> bool;
}
