//! Background reconciliation for object storage.
//!
//! A bucket has no cheap "what changed upstream" query the way a git remote
//! does, so an object-storage workspace polls instead: one immediate refresh
//! of status and tree on start, then one every interval. Git and local
//! workspaces never poll.
//!
//! A session owns exactly one poller, and starting it while it runs stops
//! the old loop first.

use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::state::WorkspaceContext;
use super::timer::TimerSlot;
use crate::backend::WorkspaceBackend;
use crate::model::{AutoSyncConfig, Provider};

pub use crate::model::auto_sync::effective_interval;

/// Stops the poll loop it was returned for. Inert if polling never started.
#[derive(Debug, Clone, Default)]
pub struct PollStopHandle {
    abort: Option<AbortHandle>,
}

impl PollStopHandle {
    pub fn stop(&self) {
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    /// Whether this handle refers to a loop that is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.abort.as_ref().is_some_and(|a| !a.is_finished())
    }
}

/// Single-slot owner of the periodic status and tree refresh.
#[derive(Debug, Default)]
pub struct BackgroundReconciliationPoller {
    slot: TimerSlot,
    interval: Option<Duration>,
}

impl BackgroundReconciliationPoller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling at the effective interval for `interval_seconds`.
    ///
    /// Any running loop is stopped first. With `enabled == false` nothing is
    /// started and the returned handle is inert.
    pub fn start<B: WorkspaceBackend>(
        &mut self,
        enabled: bool,
        interval_seconds: Option<u64>,
        ctx: &WorkspaceContext<B>,
    ) -> PollStopHandle {
        self.stop();
        if !enabled {
            return PollStopHandle::default();
        }

        let interval = effective_interval(interval_seconds);
        info!(interval_ms = interval.as_millis(), "Background reconciliation started");

        let backend = std::sync::Arc::clone(&ctx.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.start_auto_push().await {
                debug!(error = %e, "start_auto_push failed; ignoring");
            }
        });

        let ctx = ctx.clone();
        self.slot.arm_task(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                debug!("Reconciling with remote");
                ctx.refresh_quietly().await;
            }
        });
        self.interval = Some(interval);

        PollStopHandle {
            abort: self.slot.abort_handle(),
        }
    }

    /// Stop the loop. Returns `true` if one was running.
    pub fn stop(&mut self) -> bool {
        self.interval = None;
        let stopped = self.slot.cancel();
        if stopped {
            info!("Background reconciliation stopped");
        }
        stopped
    }

    /// Start or stop to match `provider` and `config`.
    ///
    /// Eligible only for object storage with auto-sync enabled. An eligible
    /// poller is always restarted so a new interval takes effect.
    pub fn reconfigure<B: WorkspaceBackend>(
        &mut self,
        provider: Provider,
        config: AutoSyncConfig,
        ctx: &WorkspaceContext<B>,
    ) -> PollStopHandle {
        let eligible = provider.polls_remote() && config.enabled;
        debug!(%provider, enabled = config.enabled, eligible, "Re-evaluating background reconciliation");
        self.start(eligible, config.interval_seconds, ctx)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.slot.is_armed()
    }

    /// Interval of the running loop.
    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        self.interval
    }
}
