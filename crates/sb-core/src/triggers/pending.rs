use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::{TriggerEvent, TriggerKind};

/// What became of an offered trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDisposition {
    /// Queued as a new pending entry.
    Accepted,
    /// Arrived inside the per-kind debounce window and was dropped.
    Debounced,
    /// Outside the window, but the kind was already pending; the repeat
    /// collapsed into the existing entry.
    Coalesced,
}

/// The debounced, coalescing set of triggers waiting for the next poll.
///
/// The hook thread only ever offers and the dispatcher only ever drains, so
/// a plain `Mutex` around this struct gives the hook a constant-time,
/// non-blocking hand-off. Arrival order across kinds is preserved.
#[derive(Debug)]
pub struct PendingTriggers {
    window: Duration,
    last_accepted: HashMap<TriggerKind, Instant>,
    queue: Vec<TriggerEvent>,
}

impl PendingTriggers {
    /// Debounce window covering hardware auto-repeat and double-fires.
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: HashMap::new(),
            queue: Vec::new(),
        }
    }

    /// Offer one trigger observed at `now`.
    ///
    /// Inside the kind's debounce window the trigger is dropped outright.
    /// Outside it the per-kind clock restarts; the event queues unless the
    /// kind is already pending, in which case it keeps its original slot.
    pub fn offer(&mut self, kind: TriggerKind, now: Instant) -> TriggerDisposition {
        if let Some(last) = self.last_accepted.get(&kind) {
            if now.duration_since(*last) < self.window {
                #[cfg(feature = "tracing")]
                tracing::trace!(kind = %kind, "trigger debounced");
                return TriggerDisposition::Debounced;
            }
        }
        self.last_accepted.insert(kind, now);
        if self.queue.iter().any(|e| e.kind == kind) {
            return TriggerDisposition::Coalesced;
        }
        self.queue.push(TriggerEvent { kind, at: now });
        TriggerDisposition::Accepted
    }

    /// Take the whole pending batch in arrival order.
    pub fn drain(&mut self) -> Vec<TriggerEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for PendingTriggers {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}
