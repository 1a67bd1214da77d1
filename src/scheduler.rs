use std::time::Duration;
use trait_variant::make;

/// Deferred work handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Timer abstraction used by the poll controller and the page model.
///
/// Production code runs on tokio timers; tests substitute a scheduler that records
/// requested delays instead of waiting for them.
#[make(Send)]
pub trait Scheduler: Clone + Send + Sync + 'static {
    /// Suspend the calling sequence for `duration`.
    async fn sleep(&self, duration: Duration);

    /// Run `task` once after `delay` without blocking the caller.
    fn defer(&self, delay: Duration, task: Task);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn defer(&self, delay: Duration, task: Task) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}
