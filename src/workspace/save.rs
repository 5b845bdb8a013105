//! Save coordination.
//!
//! A save writes through the backend, and only after the backend confirms
//! success does it evict the cache entry, clear the dirty flag, refresh the
//! sync status, and report "Saved locally". Saves to the same path are
//! serialized, and the eviction is guarded by the cache revision, so an edit
//! typed while a save is in flight is never dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::state::WorkspaceContext;
use crate::backend::WorkspaceBackend;
use crate::model::Phase;

/// Shown after an explicit save succeeds.
pub const SAVED_MESSAGE: &str = "Saved locally";
/// Fallback when a failed save carries no message.
pub const SAVE_FAILED_FALLBACK: &str = "Failed to save";

/// How long "Saved locally" stays up.
pub const SAVED_REVERT: Duration = Duration::from_millis(2_000);
/// How long any error stays up.
pub const ERROR_REVERT: Duration = Duration::from_millis(5_000);

/// Result of a user-visible action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action ran and succeeded.
    Done,
    /// Nothing to do (no document open, wrong target, no remote).
    Skipped,
    /// The action ran and failed; the message is what the status shows.
    Failed(String),
}

impl ActionOutcome {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Writes documents through the backend and reports the outcome.
pub struct SaveCoordinator<B> {
    ctx: WorkspaceContext<B>,
    in_flight: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl<B> Clone for SaveCoordinator<B> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<B: WorkspaceBackend> SaveCoordinator<B> {
    pub fn new(ctx: WorkspaceContext<B>) -> Self {
        Self {
            ctx,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Save `content` for `path`, which must be the open document.
    ///
    /// With `is_autosave`, success leaves a sticky Saved phase with no message;
    /// otherwise it shows "Saved locally" for two seconds. Failure shows the
    /// error for five seconds.
    pub async fn save(&self, path: &str, content: &str, is_autosave: bool) -> ActionOutcome {
        let is_open = self
            .ctx
            .state
            .document
            .lock()
            .await
            .as_ref()
            .is_some_and(|doc| doc.path == path);
        if !is_open {
            debug!(path, "Save skipped: not the open document");
            return ActionOutcome::Skipped;
        }

        // Anything put after this point is newer than `content`.
        let revision = self.ctx.state.cache.lock().await.revision(path);

        let path_lock = self.path_lock(path).await;
        let outcome = {
            let _serialized = path_lock.lock().await;
            self.save_serialized(path, content, revision, is_autosave)
                .await
        };
        self.release_path_lock(path, path_lock).await;
        outcome
    }

    async fn save_serialized(
        &self,
        path: &str,
        content: &str,
        revision: Option<u64>,
        is_autosave: bool,
    ) -> ActionOutcome {
        if !is_autosave {
            self.ctx
                .status
                .set(Phase::Saving, "Saving...", Duration::ZERO)
                .await;
        }

        match self.ctx.backend.save(path, content).await {
            Ok(()) => {
                self.after_success(path, content, revision).await;
                info!(path, is_autosave, "Saved");

                if let Err(e) = self.ctx.refresh_status().await {
                    warn!(error = %e, "Status refresh after save failed");
                }

                if is_autosave {
                    self.ctx.status.set(Phase::Saved, "", Duration::ZERO).await;
                } else {
                    self.ctx
                        .status
                        .set(Phase::Saved, SAVED_MESSAGE, SAVED_REVERT)
                        .await;
                }
                ActionOutcome::Done
            }
            Err(e) => {
                let message = e.message_or(SAVE_FAILED_FALLBACK);
                warn!(path, error = %message, "Save failed");
                self.ctx
                    .status
                    .set(Phase::Error, message.clone(), ERROR_REVERT)
                    .await;
                ActionOutcome::Failed(message)
            }
        }
    }

    /// Evict the cache entry and clear the dirty flag, unless newer edits arrived.
    async fn after_success(&self, path: &str, content: &str, revision: Option<u64>) {
        let buffer_gone = {
            let mut cache = self.ctx.state.cache.lock().await;
            let evicted = revision.is_some_and(|rev| cache.evict_if_unchanged(path, rev));
            evicted || !cache.contains(path)
        };
        if !buffer_gone {
            debug!(path, "Newer edits arrived during save; keeping buffer");
            return;
        }

        let mut document = self.ctx.state.document.lock().await;
        if let Some(doc) = document.as_mut() {
            if doc.path == path && doc.content == content {
                doc.dirty = false;
            }
        }
    }

    async fn path_lock(&self, path: &str) -> Arc<Mutex<()>> {
        let mut locks = self.in_flight.lock().await;
        Arc::clone(locks.entry(path.to_string()).or_default())
    }

    /// Forget the lock for `path` once nobody else holds or waits on it.
    async fn release_path_lock(&self, path: &str, path_lock: Arc<Mutex<()>>) {
        let mut locks = self.in_flight.lock().await;
        // One reference in the map, one here.
        if Arc::strong_count(&path_lock) == 2 {
            locks.remove(path);
        }
    }

    #[cfg(test)]
    async fn tracked_paths(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}
