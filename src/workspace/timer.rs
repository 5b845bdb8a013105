//! Single-slot timers.
//!
//! Each controller in the workspace owns exactly one [`TimerSlot`] per kind of
//! timer. Arming a slot always aborts whatever it held before, so a slot never
//! has more than one pending fire. Dropping the slot aborts it too.
//!
//! Slots hold tokio tasks, which die with the runtime: a pending timer never
//! keeps the process alive.

use std::future::Future;
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};

/// Owner of at most one scheduled task.
#[derive(Debug, Default)]
pub struct TimerSlot {
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_fire` once after `delay`, replacing any pending timer.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.arm_task(async move {
            tokio::time::sleep(delay).await;
            on_fire.await;
        });
    }

    /// Run an arbitrary task (e.g. an interval loop), replacing any pending one.
    pub fn arm_task<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(task));
    }

    /// Abort the pending task. Returns `true` if one was still running.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let running = !handle.is_finished();
                handle.abort();
                running
            }
            None => false,
        }
    }

    /// Whether a task is scheduled and has not finished.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Handle that can abort the current task from elsewhere.
    #[must_use]
    pub fn abort_handle(&self) -> Option<AbortHandle> {
        self.handle.as_ref().map(JoinHandle::abort_handle)
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bump(count: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let count = Arc::clone(count);
        async move {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_delay() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut slot = TimerSlot::new();
        slot.arm(Duration::from_secs(5), bump(&count));
        assert!(slot.is_armed());

        tokio::time::sleep(Duration::from_millis(4_999)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!slot.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_pending_timer() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut slot = TimerSlot::new();
        slot.arm(Duration::from_secs(1), bump(&count));
        slot.arm(Duration::from_secs(3), bump(&count));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let mut slot = TimerSlot::new();
            slot.arm(Duration::from_secs(1), bump(&count));
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reports_running_state() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut slot = TimerSlot::new();
        assert!(!slot.cancel());
        slot.arm(Duration::from_secs(1), bump(&count));
        assert!(slot.cancel());
        assert!(!slot.is_armed());
    }
}
