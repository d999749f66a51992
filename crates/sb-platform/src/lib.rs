//! Platform adapters for Snapbook: the input-hook bridge runtime, the
//! screen-capture backend, and the console surfaces used by headless builds.

pub mod bridge;
pub mod capture;
pub mod console;
pub mod overlay;

pub use bridge::{TriggerBridge, TriggerSink, TriggerSourcePort};
pub use capture::XcapCapture;
pub use console::{ConsoleDialogs, LineRouter, StdinTriggerSource};
pub use overlay::HeadlessOverlay;
