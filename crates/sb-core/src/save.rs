use serde::{Deserialize, Serialize};

/// Save attempt state machine
///
/// Design principle: a pure type state machine with only state definitions
/// and transition validation. Dialog prompts, merging and disk writes are
/// driven by the application layer (sb-app); this type just makes illegal
/// orderings unrepresentable.
///
/// State transitions:
///
/// ```text
/// LoadedClean
///  │
///  ├─→ Saved                                  (disk unchanged, plain write)
///  │
///  └─→ ConflictDetected ──→ MergeInProgress ──→ Saved
///                        │                  └─→ Failed
///                        └─→ Saved           (user chose overwrite)
///
/// All active states ──→ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SavePhase {
    /// Save attempt underway, no divergence from disk observed yet
    LoadedClean,

    /// The backing file changed since the last load or save
    ConflictDetected,

    /// Reconciling the external file with the in-memory document
    MergeInProgress,

    /// The document reached disk and the baseline was refreshed
    Saved,

    /// The attempt ended without persisting (error or user cancel)
    Failed,
}

impl SavePhase {
    /// Check if this is a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Saved | Self::Failed)
    }

    /// Check if a save attempt is currently in progress
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::LoadedClean | Self::ConflictDetected | Self::MergeInProgress
        )
    }

    /// The backing file diverged from the baseline
    pub fn on_conflict(self) -> Option<Self> {
        match self {
            Self::LoadedClean => Some(Self::ConflictDetected),
            _ => None,
        }
    }

    /// The user elected to merge the divergent file
    pub fn start_merge(self) -> Option<Self> {
        match self {
            Self::ConflictDetected => Some(Self::MergeInProgress),
            _ => None,
        }
    }

    /// Transition after the write transaction finishes
    pub fn on_persisted(self, success: bool) -> Self {
        match self {
            s if s.is_active() && success => Self::Saved,
            s if s.is_active() => Self::Failed,
            _ => self,
        }
    }

    /// Mark as failed (errors and user cancellation alike)
    pub fn fail(self) -> Self {
        if self.is_active() {
            Self::Failed
        } else {
            self
        }
    }

    /// Reset for the next save attempt
    pub fn reset(self) -> Self {
        if self.is_terminal() {
            Self::LoadedClean
        } else {
            self
        }
    }
}

impl Default for SavePhase {
    fn default() -> Self {
        Self::LoadedClean
    }
}
