use std::collections::BTreeSet;
use std::path::Path;

use bytes::Bytes;

use crate::document::{Block, Document, Paragraph};
use crate::ids::AttachmentId;

/// Port over the on-disk document package format.
///
/// A package is an ordered block list plus a relationship table mapping
/// attachment ids to typed payloads. Keeping the two separate on disk is
/// what makes the attachment diff during a conflict merge possible.
pub trait PackagePort: Send + Sync {
    /// Read and decode the package at `path`.
    fn load(&self, path: &Path) -> Result<PackageSnapshot, PackageError>;

    /// Encode `document` into a package file at `path`. The caller decides
    /// where; the save transaction points this at a temp sibling.
    fn write(&self, document: &Document, path: &Path) -> Result<(), PackageError>;
}

/// A decoded package: materialized blocks plus the relationship table in
/// file order.
#[derive(Debug, Clone)]
pub struct PackageSnapshot {
    pub blocks: Vec<Block>,
    pub relationships: Vec<Relationship>,
}

impl PackageSnapshot {
    pub fn paragraph_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.as_paragraph().is_some())
            .count()
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Ids of image-kind relationships, the unit the merge diff works in.
    pub fn attachment_ids(&self) -> BTreeSet<AttachmentId> {
        self.relationships
            .iter()
            .filter(|r| r.kind.is_image())
            .map(|r| r.id.clone())
            .collect()
    }
}

/// One entry of the package's relationship table.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub id: AttachmentId,
    pub kind: RelationshipKind,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipKind {
    /// An embedded raster image; `ext` is the encoding extension.
    Image { ext: String },
    /// Anything a newer writer put in the table that this build does not
    /// understand. Carried through untouched, never merged.
    Other(String),
}

impl RelationshipKind {
    pub fn is_image(&self) -> bool {
        matches!(self, RelationshipKind::Image { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("package i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed package: {0}")]
    Malformed(String),

    #[error("unsupported package version {0}")]
    UnsupportedVersion(u32),
}
