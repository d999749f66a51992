//! Pure pixel helpers: crop a frame to a selection and encode the PNG
//! artifact the engine attaches to documents. No OS calls here, so the
//! geometry rules are testable without a display.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};

use sb_core::ports::CaptureError;
use sb_core::{CapturedImage, Region};

/// Crop `frame` to `region`, given in primary-display pixel coordinates.
pub fn crop_frame(frame: &DynamicImage, region: Region) -> Result<DynamicImage, CaptureError> {
    if region.is_empty() {
        return Err(CaptureError::EmptyCapture);
    }
    let (x, y) = match (u32::try_from(region.x), u32::try_from(region.y)) {
        (Ok(x), Ok(y)) => (x, y),
        _ => {
            return Err(CaptureError::Backend(format!(
                "region origin {},{} lies outside the primary display",
                region.x, region.y
            )))
        }
    };
    let right = x.checked_add(region.width);
    let bottom = y.checked_add(region.height);
    let fits = matches!(
        (right, bottom),
        (Some(r), Some(b)) if r <= frame.width() && b <= frame.height()
    );
    if !fits {
        return Err(CaptureError::Backend(format!(
            "region {}x{} at {},{} exceeds the {}x{} display",
            region.width,
            region.height,
            region.x,
            region.y,
            frame.width(),
            frame.height()
        )));
    }
    Ok(frame.crop_imm(x, y, region.width, region.height))
}

/// Encode a frame as a PNG capture artifact.
pub fn encode_png(frame: &DynamicImage) -> Result<CapturedImage, CaptureError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(CaptureError::EmptyCapture);
    }
    let mut png = Vec::new();
    frame
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CaptureError::Backend(format!("png encode failed: {e}")))?;
    Ok(CapturedImage::png(Bytes::from(png), frame.width(), frame.height()))
}
