//! Debounced autosave.
//!
//! Every edit re-arms a single timer for [`AUTOSAVE_DELAY`]. Continuous
//! editing keeps pushing the save out; it fires once the document has been
//! idle for the whole delay.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::timer::TimerSlot;

/// Idle period after the last edit before an autosave fires.
pub const AUTOSAVE_DELAY: Duration = Duration::from_secs(5 * 60);

/// Single-slot debounce timer for background saves.
#[derive(Debug)]
pub struct AutosaveScheduler {
    delay: Duration,
    slot: TimerSlot,
}

impl AutosaveScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::with_delay(AUTOSAVE_DELAY)
    }

    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            slot: TimerSlot::new(),
        }
    }

    /// Cancel any pending autosave and arm a new one.
    ///
    /// The save itself runs as a detached task, so re-arming while a save is
    /// in flight never aborts that save halfway through.
    pub fn schedule<F>(&mut self, save: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        debug!(delay_secs = self.delay.as_secs(), "Autosave armed");
        self.slot.arm(self.delay, async move {
            debug!("Autosave firing");
            tokio::spawn(save);
        });
    }

    /// Cancel the pending autosave, if any.
    pub fn cancel(&mut self) {
        if self.slot.cancel() {
            debug!("Autosave cancelled");
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot.is_armed()
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn save_counter(count: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let count = Arc::clone(count);
        async move {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_every_four_minutes_never_save() {
        let saves = Arc::new(AtomicUsize::new(0));
        let mut autosave = AutosaveScheduler::new();

        for _ in 0..6 {
            autosave.schedule(save_counter(&saves));
            tokio::time::sleep(Duration::from_secs(4 * 60)).await;
            assert_eq!(saves.load(Ordering::SeqCst), 0);
        }

        // One minute after the 4-minute mark is five minutes after the last edit.
        tokio::time::sleep(Duration::from_secs(60) + Duration::from_millis(1)).await;
        tokio::task::yield_now().await;
        assert_eq!(saves.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60 * 60)).await;
        assert_eq!(saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let saves = Arc::new(AtomicUsize::new(0));
        let mut autosave = AutosaveScheduler::with_delay(Duration::from_secs(1));
        autosave.schedule(save_counter(&saves));
        assert!(autosave.is_pending());

        autosave.cancel();
        assert!(!autosave.is_pending());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(saves.load(Ordering::SeqCst), 0);
    }
}
