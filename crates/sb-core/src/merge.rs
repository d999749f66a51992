//! Conflict merge planning.
//!
//! `plan_merge` compares the external package against the baseline recorded
//! at the last save and produces a pure description of what to do. The
//! application layer materializes attachments and applies the plan, so
//! everything here stays deterministic and IO-free.

use crate::document::{BaselineSnapshot, Block, Document, ImageBlock, Paragraph};
use crate::ports::{PackageSnapshot, Relationship};

/// How the paragraph bodies reconcile.
#[derive(Debug, Clone)]
pub enum ParagraphStrategy {
    /// The external file grew: bring its tail paragraphs over, formatting
    /// intact, spliced ahead of the local pending tail.
    AppendExternalTail(Vec<Paragraph>),
    /// The external file shrank or was reshaped: its blocks become the new
    /// body and the local pending tail is re-homed onto them.
    RebaseOntoExternal(Vec<Block>),
}

/// A self-contained description of one conflict merge.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub strategy: ParagraphStrategy,
    /// Image-kind relationships present externally but absent from the
    /// baseline, in relationship table order.
    pub incoming_images: Vec<Relationship>,
}

/// Diff the external snapshot against the baseline.
///
/// The paragraph heuristic is count-based on purpose: the document is an
/// append-mostly capture log, so "file grew" means new trailing content and
/// anything else means the other writer restructured the body and gets to
/// keep it.
pub fn plan_merge(baseline: &BaselineSnapshot, external: &PackageSnapshot) -> MergePlan {
    let strategy = if external.paragraph_count() > baseline.paragraph_count() {
        let tail: Vec<Paragraph> = external
            .paragraphs()
            .skip(baseline.paragraph_count())
            .cloned()
            .collect();
        ParagraphStrategy::AppendExternalTail(tail)
    } else {
        ParagraphStrategy::RebaseOntoExternal(external.blocks.clone())
    };

    let incoming_images: Vec<Relationship> = external
        .relationships
        .iter()
        .filter(|r| r.kind.is_image() && !baseline.contains_attachment(&r.id))
        .cloned()
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        external_paragraphs = external.paragraph_count(),
        baseline_paragraphs = baseline.paragraph_count(),
        incoming_images = incoming_images.len(),
        "merge planned"
    );

    MergePlan {
        strategy,
        incoming_images,
    }
}

/// Apply a plan to the document. `images` are the incoming attachments
/// already materialized into blocks (ids preserved, so a later diff will
/// not import them twice); they land at the document end in table order.
pub fn apply_plan(doc: &mut Document, strategy: ParagraphStrategy, images: Vec<ImageBlock>) {
    match strategy {
        ParagraphStrategy::AppendExternalTail(tail) => doc.splice_external_tail(tail),
        ParagraphStrategy::RebaseOntoExternal(blocks) => doc.rebase_onto(blocks),
    }
    doc.append_merged_images(images);
}
