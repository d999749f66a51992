//! The trigger bridge: owns the hook thread and the pending set, and hands
//! accepted triggers to the dispatcher as sequenced commands.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use sb_core::ports::CommandFeedPort;
use sb_core::{Command, PendingTriggers, TriggerDisposition, TriggerKind};

/// Handle the hook source uses to hand observed triggers over.
///
/// An offer is one short mutex hand-off: no I/O, no engine calls, nothing
/// that could stall the hook thread.
#[derive(Clone)]
pub struct TriggerSink {
    pending: Arc<Mutex<PendingTriggers>>,
}

impl TriggerSink {
    pub fn push(&self, kind: TriggerKind) -> TriggerDisposition {
        let disposition = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .offer(kind, Instant::now());
        match disposition {
            TriggerDisposition::Accepted => log::debug!("Trigger accepted: {kind}"),
            TriggerDisposition::Debounced => log::trace!("Trigger debounced: {kind}"),
            TriggerDisposition::Coalesced => log::trace!("Trigger coalesced: {kind}"),
        }
        disposition
    }
}

/// Port for the blocking input source driven on the bridge-owned thread.
///
/// `run` observes triggers and pushes them into `sink` until `shutdown`
/// flips or its input ends. A source parked in a blocking read may only
/// notice the flag on its next event.
pub trait TriggerSourcePort: Send + Sync {
    fn run(&self, sink: TriggerSink, shutdown: Arc<AtomicBool>);
}

struct HookThread {
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Bridges the hook thread to the main loop.
///
/// The hook side only ever offers into the pending set; the main loop is
/// the sole consumer through `poll`. Each registration gets its own
/// shutdown flag so a lingering detached thread cannot be re-armed by a
/// later register/unregister cycle.
pub struct TriggerBridge {
    pending: Arc<Mutex<PendingTriggers>>,
    source: Arc<dyn TriggerSourcePort>,
    registered: AtomicBool,
    thread: Mutex<Option<HookThread>>,
    seq: AtomicU64,
}

impl TriggerBridge {
    pub fn new(source: Arc<dyn TriggerSourcePort>) -> Self {
        Self {
            pending: Arc::new(Mutex::new(PendingTriggers::default())),
            source,
            registered: AtomicBool::new(false),
            thread: Mutex::new(None),
            seq: AtomicU64::new(0),
        }
    }

    /// A sink feeding this bridge's pending set.
    pub fn sink(&self) -> TriggerSink {
        TriggerSink {
            pending: self.pending.clone(),
        }
    }

    /// Spawn the hook thread running the source.
    pub fn register(&self) -> io::Result<()> {
        if self
            .registered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(()); // 幂等
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let sink = self.sink();
        let source = self.source.clone();
        let thread_shutdown = shutdown.clone();
        let spawned = thread::Builder::new()
            .name("sb-trigger-hook".into())
            .spawn(move || source.run(sink, thread_shutdown));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.registered.store(false, Ordering::Release);
                return Err(err);
            }
        };
        *self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(HookThread { shutdown, handle });
        log::info!("Trigger hook registered");
        Ok(())
    }

    /// Signal the hook thread and reap it if it has already stopped.
    pub fn unregister(&self) {
        if !self.registered.swap(false, Ordering::AcqRel) {
            return;
        }
        let hook = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(hook) = hook {
            hook.shutdown.store(true, Ordering::SeqCst);
            if hook.handle.is_finished() {
                let _ = hook.handle.join();
            } else {
                // A source parked in a blocking read only notices the flag
                // on its next line; teardown must not wait for that.
                log::debug!("Trigger source still blocked; leaving its thread detached");
            }
        }
        log::info!("Trigger hook unregistered");
    }
}

impl CommandFeedPort for TriggerBridge {
    fn poll(&self) -> Vec<Command> {
        let events = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain();
        events
            .into_iter()
            .map(|event| Command {
                seq: self.seq.fetch_add(1, Ordering::Relaxed) + 1,
                kind: event.kind,
            })
            .collect()
    }
}
