//! Port interfaces for the application layer
//!
//! Ports define the contract between the engine's use cases and the
//! infrastructure/platform implementations, following Hexagonal
//! Architecture. Every port here is synchronous on purpose: engine
//! operations must run to completion without suspension points, so the
//! async boundary stays in the host binary, never inside a port call.

mod clock;
mod commands;
pub mod capture;
pub mod dialog;
pub mod fs;
pub mod overlay;
pub mod package;
pub mod scratch;

pub use clock::*;
pub use commands::*;

pub use capture::{CaptureError, CapturePort};
pub use dialog::DialogPort;
pub use fs::FilesystemPort;
pub use overlay::OverlayPort;
pub use package::{PackageError, PackagePort, PackageSnapshot, Relationship, RelationshipKind};
pub use scratch::ScratchPort;
