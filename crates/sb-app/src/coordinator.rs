//! Drives one capture from trigger to appended document block, keeping the
//! persistent overlay out of its own screenshot.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use sb_core::decision::CaptureMode;
use sb_core::error::DocumentError;
use sb_core::ports::{CapturePort, ClockPort, DialogPort, OverlayPort, ScratchPort};
use sb_core::TriggerKind;

use crate::store::{DocumentStore, SaveOutcome};

/// Where the coordinator currently is in a capture flow. Flows run to
/// completion within one dispatch, so between ticks this is always `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    CaptureInFlight,
    DialogOpen,
}

/// How a capture flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The artifact was appended to the document; `save` is what the
    /// follow-up save amounted to.
    Committed { save: SaveOutcome },
    /// The user declined the capture at the caption dialog.
    Discarded,
    /// Region selection was cancelled or empty, or the trigger was a
    /// stand-alone cancel.
    Cancelled,
}

/// Restores the overlay's pre-capture visibility when dropped, so every
/// exit path of a flow puts the screen back the way it was.
struct OverlayGuard<'a> {
    overlay: &'a dyn OverlayPort,
    was_visible: bool,
}

impl<'a> OverlayGuard<'a> {
    fn engage(overlay: &'a dyn OverlayPort) -> Self {
        let was_visible = overlay.is_visible();
        if was_visible {
            overlay.hide();
        }
        Self {
            overlay,
            was_visible,
        }
    }
}

impl Drop for OverlayGuard<'_> {
    fn drop(&mut self) {
        if self.was_visible {
            self.overlay.show();
        }
    }
}

pub struct CaptureCoordinator {
    capture: Arc<dyn CapturePort>,
    overlay: Arc<dyn OverlayPort>,
    dialogs: Arc<dyn DialogPort>,
    scratch: Arc<dyn ScratchPort>,
    clock: Arc<dyn ClockPort>,
    mode: CaptureMode,
    state: CoordinatorState,
    session_captures: u64,
}

impl CaptureCoordinator {
    pub fn new(
        capture: Arc<dyn CapturePort>,
        overlay: Arc<dyn OverlayPort>,
        dialogs: Arc<dyn DialogPort>,
        scratch: Arc<dyn ScratchPort>,
        clock: Arc<dyn ClockPort>,
        mode: CaptureMode,
    ) -> Self {
        Self {
            capture,
            overlay,
            dialogs,
            scratch,
            clock,
            mode,
            state: CoordinatorState::Idle,
            session_captures: 0,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Successful grabs this session, committed or not.
    pub fn session_captures(&self) -> u64 {
        self.session_captures
    }

    /// Run the flow for one trigger to completion.
    pub fn handle(
        &mut self,
        kind: TriggerKind,
        store: &mut DocumentStore,
    ) -> Result<CaptureOutcome, DocumentError> {
        let span = info_span!("capture.flow", kind = %kind);
        let _guard = span.enter();

        if kind == TriggerKind::Cancel {
            // Flows are synchronous, so a cancel arriving on its own tick
            // has nothing left to unwind.
            debug!("Cancel trigger outside an active capture flow");
            return Ok(CaptureOutcome::Cancelled);
        }

        let result = self.capture_and_commit(kind, store);
        self.state = CoordinatorState::Idle;
        result
    }

    fn capture_and_commit(
        &mut self,
        kind: TriggerKind,
        store: &mut DocumentStore,
    ) -> Result<CaptureOutcome, DocumentError> {
        self.state = CoordinatorState::CaptureInFlight;
        let _overlay = OverlayGuard::engage(self.overlay.as_ref());

        let image = match kind {
            TriggerKind::RegionCapture => {
                let Some(region) = self.dialogs.select_region() else {
                    debug!("Region selection cancelled");
                    return Ok(CaptureOutcome::Cancelled);
                };
                if region.is_empty() {
                    debug!("Zero-area region selection");
                    return Ok(CaptureOutcome::Cancelled);
                }
                self.capture.capture_region(region)?
            }
            _ => self.capture.capture_fullscreen()?,
        };
        debug!(
            width = image.width,
            height = image.height,
            "Capture succeeded"
        );
        self.session_captures += 1;

        // A scratch copy survives even if the append below goes wrong.
        let stem = format!("capture_{}", self.clock.now().format("%Y%m%d_%H%M%S"));
        match self.scratch.spill(&stem, &image.ext, &image.bytes) {
            Ok(path) => debug!(path = %path.display(), "Capture artifact spilled to scratch"),
            Err(err) => warn!(%err, "Could not spill capture artifact to scratch"),
        }

        let auto_caption =
            kind == TriggerKind::AutoSaveCapture || self.mode == CaptureMode::Auto;
        let caption = if auto_caption {
            Some(self.clock.now().format("%Y-%m-%d %H:%M:%S").to_string())
        } else {
            self.state = CoordinatorState::DialogOpen;
            let decision = self.dialogs.present_for_caption(&image);
            if !decision.commit {
                info!("Capture discarded at caption dialog");
                return Ok(CaptureOutcome::Discarded);
            }
            (!decision.caption.is_empty()).then_some(decision.caption)
        };

        let save = store.append_capture(image, caption)?;
        Ok(CaptureOutcome::Committed { save })
    }
}
