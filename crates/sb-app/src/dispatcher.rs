//! Per-tick command dispatch from the trigger feed into the capture flow.

use std::sync::Arc;

use tracing::{debug, warn};

use sb_core::ports::CommandFeedPort;

use crate::coordinator::CaptureCoordinator;
use crate::store::DocumentStore;

/// Drains the trigger feed once per tick and routes each command, in
/// arrival order, through the capture coordinator.
///
/// A failed command is logged and swallowed so the ones behind it still
/// run; nothing may escape a tick.
pub struct CommandDispatcher {
    feed: Arc<dyn CommandFeedPort>,
}

impl CommandDispatcher {
    pub fn new(feed: Arc<dyn CommandFeedPort>) -> Self {
        Self { feed }
    }

    /// Process one batch. Returns how many commands were handled.
    pub fn tick(
        &self,
        coordinator: &mut CaptureCoordinator,
        store: &mut DocumentStore,
    ) -> usize {
        let commands = self.feed.poll();
        let count = commands.len();
        if count > 0 {
            debug!(count, "Dispatching command batch");
        }
        for command in commands {
            match coordinator.handle(command.kind, store) {
                Ok(outcome) => {
                    debug!(seq = command.seq, kind = %command.kind, ?outcome, "Command handled")
                }
                Err(err) => {
                    warn!(seq = command.seq, kind = %command.kind, %err, "Command failed")
                }
            }
        }
        count
    }
}
