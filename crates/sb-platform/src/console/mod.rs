//! Console surfaces for headless builds.
//!
//! One stdin reader owns all interactive input. Each line goes through the
//! [`LineRouter`]: a waiting prompt claims it, otherwise it is parsed as a
//! trigger key. That keeps the hook thread the sole stdin consumer and the
//! prompts free of their own reads.

mod dialogs;
mod router;
mod source;

pub use dialogs::ConsoleDialogs;
pub use router::LineRouter;
pub use source::StdinTriggerSource;
