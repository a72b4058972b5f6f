//! When a finished view change is reported back to the engine

use std::time::Duration;

/// Work to run once a change handler's animation is over
pub type FinishFn = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

/// Decides when a view change counts as finished
///
/// The renderer swaps views right away and hands the completion to the
/// scheduler together with the handler's animation length.
pub trait CompletionScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, finish: FinishFn) -> anyhow::Result<()>;
}

/// Finishes every change immediately, ignoring the delay
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl CompletionScheduler for ImmediateScheduler {
    fn schedule(&self, _delay: Duration, finish: FinishFn) -> anyhow::Result<()> {
        finish()
    }
}
