//! Screen capture through `xcap`.

mod encode;

pub use encode::{crop_frame, encode_png};

use image::DynamicImage;
use xcap::Monitor;

use sb_core::ports::{CaptureError, CapturePort};
use sb_core::{CapturedImage, Region};

/// Capture backend enumerating displays via `xcap`. Region grabs crop a
/// fresh full-frame capture, so the selection always shows current pixels.
pub struct XcapCapture;

impl XcapCapture {
    fn primary_frame() -> Result<DynamicImage, CaptureError> {
        let monitors = Monitor::all()
            .map_err(|e| CaptureError::Backend(format!("monitor enumeration failed: {e}")))?;
        let primary = monitors
            .into_iter()
            .find(|m| m.is_primary().unwrap_or(false))
            // 没有声明主屏时取第一块
            .or_else(|| Monitor::all().ok()?.into_iter().next())
            .ok_or(CaptureError::NoPrimaryDisplay)?;
        let image = primary
            .capture_image()
            .map_err(|e| CaptureError::Backend(format!("screen grab failed: {e}")))?;
        Ok(DynamicImage::ImageRgba8(image))
    }
}

impl CapturePort for XcapCapture {
    fn capture_fullscreen(&self) -> Result<CapturedImage, CaptureError> {
        let frame = Self::primary_frame()?;
        log::debug!(
            "Captured primary display at {}x{}",
            frame.width(),
            frame.height()
        );
        encode_png(&frame)
    }

    fn capture_region(&self, region: Region) -> Result<CapturedImage, CaptureError> {
        if region.is_empty() {
            return Err(CaptureError::EmptyCapture);
        }
        let frame = Self::primary_frame()?;
        let cropped = crop_frame(&frame, region)?;
        encode_png(&cropped)
    }
}
