//! Snapbook infrastructure adapters
//!
//! Filesystem-facing implementations of the sb-core ports: the std
//! filesystem passthrough, the scratch directory, the on-disk package
//! codec, the system clock and settings persistence.

pub mod fs;
pub mod package;
pub mod scratch;
pub mod settings;
pub mod time;

pub use fs::StdFilesystem;
pub use package::JsonPackage;
pub use scratch::ScratchDir;
pub use settings::{Settings, SettingsStore};
pub use time::SystemClock;
