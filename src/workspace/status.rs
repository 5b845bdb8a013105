//! Transient status controller.
//!
//! Every user-visible action (save, pull, fetch, push, sync, workspace load)
//! reports through one controller, so exactly one status is shown at a time
//! and the newest action always wins:
//!
//! ```text
//! Idle ──start──▶ Saving ──ok──▶ Saved ──timeout (unless sticky)──▶ Idle
//!                   │
//!                   └──fail──▶ Error ──timeout──▶ Idle
//! ```
//!
//! Any phase can be pre-empted by a new [`TransientStatusController::set`],
//! which cancels the pending revert before arming its own.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::debug;

use super::timer::TimerSlot;
use crate::model::{Phase, TransientStatus};

/// Owner of the displayed status and its auto-revert timer.
#[derive(Clone)]
pub struct TransientStatusController {
    shared: Arc<Shared>,
}

struct Shared {
    tx: watch::Sender<TransientStatus>,
    revert: Mutex<RevertState>,
}

#[derive(Default)]
struct RevertState {
    /// Bumped on every set/cancel; a revert only applies to its own generation.
    generation: u64,
    timer: TimerSlot,
}

impl TransientStatusController {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TransientStatus::idle());
        Self {
            shared: Arc::new(Shared {
                tx,
                revert: Mutex::new(RevertState::default()),
            }),
        }
    }

    /// Show `phase`/`message` now; revert to idle after `timeout` unless it is zero.
    pub async fn set(&self, phase: Phase, message: impl Into<String>, timeout: Duration) {
        let message = message.into();
        let mut state = self.shared.revert.lock().await;
        state.generation += 1;
        state.timer.cancel();
        let generation = state.generation;

        debug!(%phase, %message, timeout_ms = timeout.as_millis(), "Transient status");
        self.shared
            .tx
            .send_replace(TransientStatus::new(phase, message));

        if !timeout.is_zero() {
            let shared = Arc::downgrade(&self.shared);
            state.timer.arm(timeout, revert_to_idle(shared, generation));
        }
    }

    /// Cancel the pending revert without changing what is shown.
    pub async fn cancel_revert(&self) {
        let mut state = self.shared.revert.lock().await;
        state.generation += 1;
        state.timer.cancel();
    }

    /// The status shown right now.
    #[must_use]
    pub fn current(&self) -> TransientStatus {
        self.shared.tx.borrow().clone()
    }

    /// Receiver that observes every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TransientStatus> {
        self.shared.tx.subscribe()
    }

    /// Whether an auto-revert is pending.
    pub async fn has_pending_revert(&self) -> bool {
        self.shared.revert.lock().await.timer.is_armed()
    }
}

impl Default for TransientStatusController {
    fn default() -> Self {
        Self::new()
    }
}

async fn revert_to_idle(shared: Weak<Shared>, generation: u64) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let state = shared.revert.lock().await;
    if state.generation == generation {
        shared.tx.send_replace(TransientStatus::idle());
    }
}
