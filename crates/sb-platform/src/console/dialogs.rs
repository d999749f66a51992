use std::io::{self, Write};
use std::sync::Arc;

use sb_core::decision::{CaptionDecision, CloseChoice, ConflictChoice, MergeFailureChoice};
use sb_core::ports::DialogPort;
use sb_core::{CapturedImage, Region};

use crate::console::LineRouter;

/// Console rendition of the decision prompts.
///
/// Answers arrive through the [`LineRouter`], never from a direct stdin
/// read. With the reader gone every prompt takes the choice that loses no
/// data: captures commit bare, closes save, conflicts leave the disk copy
/// alone.
pub struct ConsoleDialogs {
    router: Arc<LineRouter>,
}

impl ConsoleDialogs {
    pub fn new(router: Arc<LineRouter>) -> Self {
        Self { router }
    }

    fn ask(&self, prompt: &str) -> Option<String> {
        if self.router.is_closed() {
            return None;
        }
        let answer = self.router.expect_answer();
        print!("{prompt} ");
        let _ = io::stdout().flush();
        answer.recv().ok()
    }

    /// First letter of the answer, lowercased.
    fn choose(&self, prompt: &str) -> Option<char> {
        self.ask(prompt)
            .and_then(|line| line.trim().chars().next())
            .map(|c| c.to_ascii_lowercase())
    }
}

impl DialogPort for ConsoleDialogs {
    fn present_for_caption(&self, image: &CapturedImage) -> CaptionDecision {
        let prompt = format!(
            "Caption for the {}x{} capture ('-' discards, empty commits bare):",
            image.width, image.height
        );
        match self.ask(&prompt) {
            None => {
                log::warn!("No console for the caption prompt; committing without one");
                CaptionDecision::commit("")
            }
            Some(line) => {
                let text = line.trim();
                if text == "-" {
                    CaptionDecision::discard()
                } else {
                    CaptionDecision::commit(text)
                }
            }
        }
    }

    fn select_region(&self) -> Option<Region> {
        let line = self.ask("Region as 'x y width height' (empty cancels):")?;
        let region = parse_region(&line);
        if region.is_none() && !line.trim().is_empty() {
            log::warn!("Unusable region {:?}; capture cancelled", line.trim());
        }
        region
    }

    fn present_conflict(&self) -> ConflictChoice {
        match self.choose("File changed on disk. [m]erge / [o]verwrite / [c]ancel:") {
            Some('m') => ConflictChoice::Merge,
            Some('o') => ConflictChoice::Overwrite,
            _ => ConflictChoice::Cancel,
        }
    }

    fn present_merge_failure(&self, reason: &str) -> MergeFailureChoice {
        let prompt = format!("Merge failed ({reason}). [o]verwrite / [c]ancel:");
        match self.choose(&prompt) {
            Some('o') => MergeFailureChoice::Overwrite,
            _ => MergeFailureChoice::Cancel,
        }
    }

    fn present_close_confirmation(&self) -> CloseChoice {
        match self.choose("Unsaved changes. [s]ave / [d]iscard / [c]ancel:") {
            Some('s') => CloseChoice::Save,
            Some('d') => CloseChoice::Discard,
            Some(_) => CloseChoice::Cancel,
            None => {
                log::warn!("No console for the close prompt; saving");
                CloseChoice::Save
            }
        }
    }

    fn confirm_discard_after_failure(&self, reason: &str) -> bool {
        let prompt = format!("Saving failed ({reason}). Close anyway and lose changes? [y/N]:");
        matches!(self.choose(&prompt), Some('y'))
    }
}

fn parse_region(line: &str) -> Option<Region> {
    let mut parts = line.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Region::new(x, y, width, height))
}
