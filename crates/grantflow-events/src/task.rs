//! Cancellable delayed work.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// A unit of work that runs once after a delay unless cancelled first.
///
/// Cancellation only takes effect while the delay is still running; once the
/// work has started it runs to completion.
#[derive(Debug)]
pub struct ScheduledTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Schedule `work` to run after `delay`, tracked by `tracker`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(tracker: &TaskTracker, delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tracker.spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {},
                () = tokio::time::sleep(delay) => work.await,
            }
        });
        Self { cancel, handle }
    }

    /// Cancel the task if its delay has not elapsed yet.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`ScheduledTask::cancel`] was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the task has finished, by running or by being cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
