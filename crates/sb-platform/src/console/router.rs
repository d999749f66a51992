use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TrySendError};
use std::sync::{Mutex, PoisonError};

/// Hands input lines from the reader thread to whichever console prompt is
/// waiting, falling back to the caller when none is.
///
/// At most one prompt waits at a time (prompt calls run synchronously on
/// the main loop), so the slot is a single sender.
pub struct LineRouter {
    waiting: Mutex<Option<SyncSender<String>>>,
    closed: AtomicBool,
}

impl LineRouter {
    pub fn new() -> Self {
        Self {
            waiting: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Claim the next input line. The returned receiver yields it, or errors
    /// once the reader is gone.
    pub fn expect_answer(&self) -> Receiver<String> {
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        *self.waiting.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    /// Route one line. `None` means a prompt consumed it; `Some` returns it
    /// to the caller for trigger parsing.
    pub fn route(&self, line: String) -> Option<String> {
        let waiting = self
            .waiting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(tx) = waiting else {
            return Some(line);
        };
        match tx.try_send(line) {
            Ok(()) => None,
            // The prompt gave up before its answer arrived.
            Err(TrySendError::Disconnected(line)) | Err(TrySendError::Full(line)) => Some(line),
        }
    }

    /// The reader thread is gone: wake any waiting prompt and make future
    /// prompts resolve to their defaults immediately.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.waiting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for LineRouter {
    fn default() -> Self {
        Self::new()
    }
}
