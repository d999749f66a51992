//! # sb-core
//!
//! Core domain models and business logic for Snapbook.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod capture;
pub mod decision;
pub mod document;
pub mod error;
pub mod ids;
pub mod merge;
pub mod ports;
pub mod save;
pub mod triggers;

// Re-export commonly used types at the crate root
pub use capture::{CapturedImage, Region};
pub use document::{BaselineSnapshot, Block, Document, ImageBlock, Paragraph, PendingEdit, TextRun};
pub use error::{DocumentError, TransactionError, TransactionPhase};
pub use ids::AttachmentId;
pub use save::SavePhase;
pub use triggers::{Command, PendingTriggers, TriggerDisposition, TriggerEvent, TriggerKind};
