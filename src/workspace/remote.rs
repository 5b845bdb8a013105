//! Provider-aware remote actions.
//!
//! "Commit and push" is one user action whose meaning depends on the
//! provider. For git it commits everything and pushes. For object storage
//! there is nothing to commit, so push is the sync primitive. It is followed
//! by a pull of objects that are newer in the bucket, and because a bucket can
//! change underneath the session in ways a working copy cannot, a successful
//! sync reloads tree, status, and the open document.
//!
//! Pending edits to the open document are flushed first. The flush is awaited,
//! not raced against a timer; if it fails the sync does not start and the
//! save error stays visible.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::save::{ActionOutcome, ERROR_REVERT, SaveCoordinator};
use super::state::WorkspaceContext;
use crate::backend::WorkspaceBackend;
use crate::error::ApiResult;
use crate::model::{CommitOutcome, Phase, Provider};

/// Revert for a successful git commit-and-push (and other git actions).
pub const GIT_SUCCESS_REVERT: Duration = Duration::from_millis(3_000);
/// Revert for a successful object-storage sync.
pub const BUCKET_SUCCESS_REVERT: Duration = Duration::from_millis(2_000);

/// Remote operations a user can trigger besides commit-and-push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteAction {
    Pull,
    Fetch,
    Push,
}

impl RemoteAction {
    const fn progress(self) -> &'static str {
        match self {
            Self::Pull => "Pulling...",
            Self::Fetch => "Fetching...",
            Self::Push => "Pushing...",
        }
    }

    const fn success(self) -> &'static str {
        match self {
            Self::Pull => "Pulled successfully",
            Self::Fetch => "Fetched successfully",
            Self::Push => "Pushed successfully",
        }
    }

    const fn fallback(self) -> &'static str {
        match self {
            Self::Pull => "Failed to pull",
            Self::Fetch => "Failed to fetch",
            Self::Push => "Failed to push",
        }
    }
}

/// Runs commit-and-push / sync and the other remote actions.
pub struct RemoteSyncOrchestrator<B> {
    ctx: WorkspaceContext<B>,
    saver: SaveCoordinator<B>,
}

impl<B> Clone for RemoteSyncOrchestrator<B> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            saver: self.saver.clone(),
        }
    }
}

impl<B: WorkspaceBackend> RemoteSyncOrchestrator<B> {
    pub fn new(ctx: WorkspaceContext<B>, saver: SaveCoordinator<B>) -> Self {
        Self { ctx, saver }
    }

    /// Flush the open document, then commit-and-push (git) or sync (object storage).
    pub async fn commit_and_push(&self) -> ActionOutcome {
        let provider = self.ctx.backend.provider();
        let result = match provider {
            Provider::Git => {
                if let Some(failed) = self.begin("Committing and pushing...").await {
                    return failed;
                }
                self.commit_and_push_git().await
            }
            Provider::ObjectStorage => {
                if let Some(failed) = self.begin("Syncing...").await {
                    return failed;
                }
                self.sync_bucket().await
            }
            Provider::Local => {
                debug!("Commit and push skipped: local workspace has no remote");
                return ActionOutcome::Skipped;
            }
        };

        if let Err(e) = self.ctx.refresh_status().await {
            warn!(error = %e, "Status refresh after sync failed");
        }

        match result {
            Ok((phase, message, revert)) => {
                info!(%provider, %message, "Sync finished");
                self.ctx.status.set(phase, message, revert).await;
                ActionOutcome::Done
            }
            Err(e) => {
                let fallback = match provider {
                    Provider::ObjectStorage => "Failed to sync",
                    Provider::Git | Provider::Local => "Failed to commit and push",
                };
                let message = e.message_or(fallback);
                warn!(%provider, error = %message, "Sync failed");
                self.ctx
                    .status
                    .set(Phase::Error, message.clone(), ERROR_REVERT)
                    .await;
                ActionOutcome::Failed(message)
            }
        }
    }

    /// Run pull, fetch, or push with its own status messages.
    ///
    /// A successful pull reloads tree, status, and the open document.
    pub async fn run(&self, action: RemoteAction) -> ActionOutcome {
        let provider = self.ctx.backend.provider();
        if !provider.has_remote() {
            debug!(?action, "Skipped: local workspace has no remote");
            return ActionOutcome::Skipped;
        }

        self.ctx
            .status
            .set(Phase::Saving, action.progress(), Duration::ZERO)
            .await;

        let result = match action {
            RemoteAction::Pull => self.ctx.backend.pull().await,
            RemoteAction::Fetch => self.ctx.backend.fetch().await,
            RemoteAction::Push => self.ctx.backend.push().await,
        };

        match result {
            Ok(()) => {
                if action == RemoteAction::Pull {
                    self.reload_after_remote_change().await;
                } else if let Err(e) = self.ctx.refresh_status().await {
                    warn!(error = %e, "Status refresh failed");
                }
                self.ctx
                    .status
                    .set(Phase::Saved, action.success(), success_revert(provider))
                    .await;
                ActionOutcome::Done
            }
            Err(e) => {
                let message = e.message_or(action.fallback());
                warn!(?action, error = %message, "Remote action failed");
                self.ctx
                    .status
                    .set(Phase::Error, message.clone(), ERROR_REVERT)
                    .await;
                ActionOutcome::Failed(message)
            }
        }
    }

    /// Flush the open document and show the progress message.
    ///
    /// Returns the failed outcome if the flush failed and the sync must not run.
    async fn begin(&self, progress: &str) -> Option<ActionOutcome> {
        let pending = self
            .ctx
            .open_document()
            .await
            .filter(|doc| doc.dirty);
        if let Some(doc) = pending {
            debug!(path = %doc.path, "Flushing open document before sync");
            let outcome = self.saver.save(&doc.path, &doc.content, false).await;
            if outcome.is_failed() {
                return Some(outcome);
            }
        }

        self.ctx
            .status
            .set(Phase::Saving, progress, Duration::ZERO)
            .await;
        None
    }

    async fn commit_and_push_git(&self) -> ApiResult<(Phase, String, Duration)> {
        let outcome = self.ctx.backend.commit_and_push_all().await?;
        Ok(match outcome {
            CommitOutcome::NothingToCommit => (
                Phase::Idle,
                CommitOutcome::NOTHING_TO_COMMIT.to_string(),
                GIT_SUCCESS_REVERT,
            ),
            CommitOutcome::Committed { .. } => (
                Phase::Saved,
                "Committed and pushed successfully".to_string(),
                GIT_SUCCESS_REVERT,
            ),
        })
    }

    async fn sync_bucket(&self) -> ApiResult<(Phase, String, Duration)> {
        self.ctx.backend.push().await?;
        self.ctx.backend.pull().await?;
        self.reload_after_remote_change().await;
        Ok((
            Phase::Saved,
            "Synced successfully".to_string(),
            BUCKET_SUCCESS_REVERT,
        ))
    }

    /// Reload tree, status, and the open document from the backend.
    async fn reload_after_remote_change(&self) {
        self.ctx.refresh_quietly().await;
        if let Err(e) = self.ctx.reload_open_document().await {
            warn!(error = %e, "Reloading open document failed");
        }
    }
}

const fn success_revert(provider: Provider) -> Duration {
    match provider {
        Provider::ObjectStorage => BUCKET_SUCCESS_REVERT,
        Provider::Git | Provider::Local => GIT_SUCCESS_REVERT,
    }
}
