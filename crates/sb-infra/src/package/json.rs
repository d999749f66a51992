use std::collections::HashMap;
use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use sb_core::ids::AttachmentId;
use sb_core::ports::{PackageError, PackagePort, PackageSnapshot, Relationship, RelationshipKind};
use sb_core::{Block, Document, Paragraph, TextRun};

/// 当前包格式版本；读取端拒绝更新的版本
const FORMAT_VERSION: u32 = 1;

const IMAGE_KIND: &str = "image";
const DEFAULT_WIDTH_HINT: u32 = 960;

/// JSON rendition of the package format: a versioned block list plus a
/// base64-payload relationship table.
pub struct JsonPackage {
    /// Display width recorded with each image block, for renderers.
    width_hint: u32,
}

impl JsonPackage {
    pub fn new(width_hint: u32) -> Self {
        Self { width_hint }
    }
}

impl Default for JsonPackage {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH_HINT)
    }
}

#[derive(Serialize, Deserialize)]
struct PackageFile {
    version: u32,
    blocks: Vec<BlockRepr>,
    relationships: Vec<RelationshipRepr>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockRepr {
    Paragraph {
        runs: Vec<TextRun>,
    },
    Image {
        rel: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_width: Option<u32>,
    },
}

#[derive(Serialize, Deserialize)]
struct RelationshipRepr {
    id: String,
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ext: Option<String>,
    /// base64 payload
    data: String,
}

impl PackagePort for JsonPackage {
    fn load(&self, path: &Path) -> Result<PackageSnapshot, PackageError> {
        let raw = fs::read(path)?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(PackageError::Malformed("empty package file".into()));
        }
        let file: PackageFile = serde_json::from_slice(&raw)
            .map_err(|e| PackageError::Malformed(e.to_string()))?;
        if file.version > FORMAT_VERSION {
            return Err(PackageError::UnsupportedVersion(file.version));
        }

        let mut relationships = Vec::with_capacity(file.relationships.len());
        for repr in file.relationships {
            let bytes = BASE64
                .decode(repr.data.as_bytes())
                .map_err(|e| {
                    PackageError::Malformed(format!("relationship {}: bad payload: {e}", repr.id))
                })?;
            let kind = if repr.kind == IMAGE_KIND {
                RelationshipKind::Image {
                    ext: repr.ext.unwrap_or_else(|| "png".to_string()),
                }
            } else {
                RelationshipKind::Other(repr.kind)
            };
            relationships.push(Relationship {
                id: AttachmentId::from_string(repr.id),
                kind,
                bytes: Bytes::from(bytes),
            });
        }

        let by_id: HashMap<&AttachmentId, &Relationship> =
            relationships.iter().map(|r| (&r.id, r)).collect();
        let mut blocks = Vec::with_capacity(file.blocks.len());
        for repr in file.blocks {
            match repr {
                BlockRepr::Paragraph { runs } => {
                    blocks.push(Block::Text(Paragraph::from_runs(runs)));
                }
                BlockRepr::Image { rel, .. } => {
                    let id = AttachmentId::from_string(rel);
                    let relationship = by_id.get(&id).ok_or_else(|| {
                        PackageError::Malformed(format!(
                            "image block references unknown relationship {id}"
                        ))
                    })?;
                    let RelationshipKind::Image { ext } = &relationship.kind else {
                        return Err(PackageError::Malformed(format!(
                            "image block references non-image relationship {id}"
                        )));
                    };
                    blocks.push(Block::Image(sb_core::ImageBlock::with_id(
                        id,
                        relationship.bytes.clone(),
                        ext.clone(),
                    )));
                }
            }
        }

        Ok(PackageSnapshot {
            blocks,
            relationships,
        })
    }

    fn write(&self, document: &Document, path: &Path) -> Result<(), PackageError> {
        let mut blocks = Vec::with_capacity(document.blocks().len());
        let mut relationships = Vec::new();
        for block in document.blocks() {
            match block {
                Block::Text(p) => blocks.push(BlockRepr::Paragraph {
                    runs: p.runs.clone(),
                }),
                Block::Image(img) => {
                    blocks.push(BlockRepr::Image {
                        rel: img.id.to_string(),
                        display_width: Some(self.width_hint),
                    });
                    relationships.push(RelationshipRepr {
                        id: img.id.to_string(),
                        kind: IMAGE_KIND.to_string(),
                        ext: Some(img.ext.clone()),
                        data: BASE64.encode(&img.bytes),
                    });
                }
            }
        }

        let file = PackageFile {
            version: FORMAT_VERSION,
            blocks,
            relationships,
        };
        let encoded = serde_json::to_vec(&file)
            .map_err(|e| PackageError::Malformed(e.to_string()))?;
        fs::write(path, encoded)?;
        log::debug!("package written: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sb_core::ImageBlock;

    fn codec() -> JsonPackage {
        JsonPackage::default()
    }

    fn sample_document(dir: &Path) -> Document {
        let mut doc = Document::new(dir.join("doc.sbk"));
        doc.push_block(Block::Text(Paragraph::from_runs(vec![
            TextRun::bold("Heading"),
            TextRun::plain(" and tail"),
        ])));
        doc.push_paragraph("plain line");
        doc.push_block(Block::Image(ImageBlock::new(
            Bytes::from_static(b"\x89PNG pixels"),
            "png",
        )));
        doc
    }

    #[test]
    fn round_trip_preserves_runs_and_attachments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = sample_document(dir.path());
        let path = dir.path().join("doc.sbk");

        codec().write(&doc, &path).expect("write");
        let snapshot = codec().load(&path).expect("load");

        assert_eq!(snapshot.blocks.len(), 3);
        let heading = snapshot.blocks[0].as_paragraph().expect("paragraph");
        assert_eq!(heading.runs.len(), 2);
        assert!(heading.runs[0].bold);
        assert_eq!(heading.text(), "Heading and tail");

        assert_eq!(snapshot.relationships.len(), 1);
        let rel = &snapshot.relationships[0];
        assert!(rel.kind.is_image());
        assert_eq!(rel.bytes, Bytes::from_static(b"\x89PNG pixels"));

        let img = snapshot.blocks[2].as_image().expect("image block");
        assert_eq!(&img.id, &rel.id);
    }

    #[test]
    fn writes_are_byte_identical_for_an_unchanged_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = sample_document(dir.path());
        let first = dir.path().join("a.sbk");
        let second = dir.path().join("b.sbk");

        codec().write(&doc, &first).expect("write");
        codec().write(&doc, &second).expect("write");

        assert_eq!(
            std::fs::read(&first).expect("read"),
            std::fs::read(&second).expect("read")
        );
    }

    #[test]
    fn empty_file_is_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.sbk");
        std::fs::write(&path, b"  \n").expect("write");

        let err = codec().load(&path).expect_err("must fail");
        assert!(matches!(err, PackageError::Malformed(_)));
    }

    #[test]
    fn missing_file_is_io() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = codec()
            .load(&dir.path().join("gone.sbk"))
            .expect_err("must fail");
        assert!(matches!(err, PackageError::Io(_)));
    }

    #[test]
    fn newer_version_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("future.sbk");
        std::fs::write(
            &path,
            br#"{"version": 9, "blocks": [], "relationships": []}"#,
        )
        .expect("write");

        let err = codec().load(&path).expect_err("must fail");
        assert!(matches!(err, PackageError::UnsupportedVersion(9)));
    }

    #[test]
    fn dangling_image_reference_is_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dangling.sbk");
        std::fs::write(
            &path,
            br#"{"version": 1, "blocks": [{"type": "image", "rel": "missing"}], "relationships": []}"#,
        )
        .expect("write");

        let err = codec().load(&path).expect_err("must fail");
        assert!(matches!(err, PackageError::Malformed(_)));
    }

    #[test]
    fn unknown_relationship_kinds_are_carried_through() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("exotic.sbk");
        std::fs::write(
            &path,
            br#"{"version": 1, "blocks": [], "relationships": [{"id": "x1", "kind": "audio", "data": "AAECAw=="}]}"#,
        )
        .expect("write");

        let snapshot = codec().load(&path).expect("load");
        assert_eq!(snapshot.relationships.len(), 1);
        assert!(!snapshot.relationships[0].kind.is_image());
        // Non-image kinds stay out of the attachment diff universe.
        assert!(snapshot.attachment_ids().is_empty());
    }
}
