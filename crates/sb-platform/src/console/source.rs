use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sb_core::TriggerKind;

use crate::bridge::{TriggerSink, TriggerSourcePort};
use crate::console::LineRouter;

/// Trigger source reading single-letter commands from stdin. Lines claimed
/// by a waiting console prompt bypass trigger parsing entirely.
pub struct StdinTriggerSource {
    router: Arc<LineRouter>,
}

impl StdinTriggerSource {
    pub fn new(router: Arc<LineRouter>) -> Self {
        Self { router }
    }
}

impl TriggerSourcePort for StdinTriggerSource {
    fn run(&self, sink: TriggerSink, shutdown: Arc<AtomicBool>) {
        log::info!("Trigger keys: f fullscreen / r region / a auto-save / c cancel");
        let stdin = io::stdin();
        let mut line = String::new();
        while !shutdown.load(Ordering::SeqCst) {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) => {
                    log::debug!("Stdin closed; trigger source exiting");
                    break;
                }
                Ok(_) => {
                    let Some(raw) = self.router.route(std::mem::take(&mut line)) else {
                        continue;
                    };
                    match parse_trigger(&raw) {
                        Some(kind) => {
                            sink.push(kind);
                        }
                        None if raw.trim().is_empty() => {}
                        None => log::warn!("Unrecognized trigger input: {:?}", raw.trim()),
                    }
                }
                Err(err) => {
                    log::warn!("Stdin read failed: {err}");
                    break;
                }
            }
        }
        // No more answers can arrive; waiting prompts fall back to defaults.
        self.router.close();
    }
}

fn parse_trigger(line: &str) -> Option<TriggerKind> {
    match line.trim().to_ascii_lowercase().as_str() {
        "f" | "full" | "fullscreen" => Some(TriggerKind::FullscreenCapture),
        "r" | "region" => Some(TriggerKind::RegionCapture),
        "a" | "auto" => Some(TriggerKind::AutoSaveCapture),
        "c" | "esc" | "cancel" => Some(TriggerKind::Cancel),
        _ => None,
    }
}
