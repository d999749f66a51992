use crate::capture::{CapturedImage, Region};

/// Port for taking screenshots of the primary display.
pub trait CapturePort: Send + Sync {
    /// Capture the whole primary display.
    fn capture_fullscreen(&self) -> Result<CapturedImage, CaptureError>;

    /// Capture the given region of the virtual screen. Implementations may
    /// reject regions that fall outside the display bounds.
    fn capture_region(&self, region: Region) -> Result<CapturedImage, CaptureError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no primary display available")]
    NoPrimaryDisplay,

    /// The capture produced no pixels, e.g. a zero-area region. Recoverable:
    /// callers treat it as a cancelled capture.
    #[error("capture produced an empty image")]
    EmptyCapture,

    #[error("capture backend failure: {0}")]
    Backend(String),
}
