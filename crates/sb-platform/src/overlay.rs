use std::sync::atomic::{AtomicBool, Ordering};

use sb_core::ports::OverlayPort;

/// Overlay handle for builds without a floating widget. Visibility is one
/// flag, so the coordinator's hide/restore choreography still round-trips.
pub struct HeadlessOverlay {
    visible: AtomicBool,
}

impl HeadlessOverlay {
    pub fn new(visible: bool) -> Self {
        Self {
            visible: AtomicBool::new(visible),
        }
    }
}

impl OverlayPort for HeadlessOverlay {
    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
        log::trace!("Overlay hidden");
    }

    fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
        log::trace!("Overlay shown");
    }
}
