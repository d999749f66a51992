//! Captured-image value types shared by the capture ports and the document.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A rectangular region in virtual-screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-area selections cancel a capture instead of producing one.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An encoded screenshot ready to be attached to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    /// Encoding extension without the dot, e.g. `png`.
    pub ext: String,
}

impl CapturedImage {
    pub fn png(bytes: Bytes, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
            ext: "png".to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() || self.width == 0 || self.height == 0
    }
}
