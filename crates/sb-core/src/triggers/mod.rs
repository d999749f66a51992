//! Trigger events crossing the input-hook boundary and the commands the
//! dispatcher hands to the engine.

mod pending;

pub use pending::{PendingTriggers, TriggerDisposition};

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// The trigger vocabulary understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    /// Capture the primary display in full.
    FullscreenCapture,
    /// Capture a user-selected rectangle.
    RegionCapture,
    /// Capture the full screen and commit it without a caption dialog.
    AutoSaveCapture,
    /// Abort whatever capture interaction is in progress.
    Cancel,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 4] = [
        TriggerKind::FullscreenCapture,
        TriggerKind::RegionCapture,
        TriggerKind::AutoSaveCapture,
        TriggerKind::Cancel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TriggerKind::FullscreenCapture => "fullscreen-capture",
            TriggerKind::RegionCapture => "region-capture",
            TriggerKind::AutoSaveCapture => "auto-save-capture",
            TriggerKind::Cancel => "cancel",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw trigger as observed on the hook thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub kind: TriggerKind,
    pub at: Instant,
}

/// A trigger accepted for dispatch, tagged with a process-wide sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub seq: u64,
    pub kind: TriggerKind,
}
