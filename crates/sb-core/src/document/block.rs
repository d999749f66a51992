use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ids::AttachmentId;

/// A run of text sharing one set of character formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic: false,
            underline: false,
        }
    }
}

/// One paragraph, an ordered list of formatted runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
        }
    }

    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    /// Concatenated text of all runs, formatting stripped.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// An image embedded in the document body. The payload is kept beside the
/// block so the package codec can split body and attachment table on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub id: AttachmentId,
    pub bytes: Bytes,
    /// Encoding extension without the dot, e.g. `png`.
    pub ext: String,
}

impl ImageBlock {
    pub fn new(bytes: Bytes, ext: impl Into<String>) -> Self {
        Self {
            id: AttachmentId::new(),
            bytes,
            ext: ext.into(),
        }
    }

    /// Rebuild a block whose id is already fixed, e.g. when loading a
    /// package or importing an attachment from a concurrent edit.
    pub fn with_id(id: AttachmentId, bytes: Bytes, ext: impl Into<String>) -> Self {
        Self {
            id,
            bytes,
            ext: ext.into(),
        }
    }
}

/// A document body element in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text(Paragraph),
    Image(ImageBlock),
}

impl Block {
    pub fn plain_text(text: impl Into<String>) -> Self {
        Block::Text(Paragraph::plain(text))
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Text(p) => Some(p),
            Block::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageBlock> {
        match self {
            Block::Image(img) => Some(img),
            Block::Text(_) => None,
        }
    }
}
