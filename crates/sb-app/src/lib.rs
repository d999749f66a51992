//! Snapbook application layer
//!
//! Use cases driving the document pipeline: dispatching polled trigger
//! commands, running capture flows and saving the document with conflict
//! reconciliation. Everything in here is synchronous and single-threaded;
//! the host loop owns the tick cadence.

pub mod coordinator;
pub mod dispatcher;
pub mod store;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{CaptureCoordinator, CaptureOutcome, CoordinatorState};
pub use dispatcher::CommandDispatcher;
pub use store::{CloseOutcome, DocumentStore, SaveOutcome};
pub use transaction::PersistenceTransaction;
