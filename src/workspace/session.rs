//! Workspace session.
//!
//! One [`WorkspaceSession`] per opened workspace. It owns the cache, the
//! status controller, the autosave timer, and the background poller, and is
//! the only thing callers talk to. Dropping the session or calling
//! [`WorkspaceSession::close`] cancels every timer it owns.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::autosave::AutosaveScheduler;
use super::poller::BackgroundReconciliationPoller;
use super::remote::{RemoteAction, RemoteSyncOrchestrator};
use super::save::{ActionOutcome, ERROR_REVERT, SAVED_REVERT, SaveCoordinator};
use super::state::{WorkspaceContext, WorkspaceState};
use crate::backend::WorkspaceBackend;
use crate::error::ApiResult;
use crate::model::{
    AutoSyncConfig, OpenDocument, Phase, Provider, SyncStatus, TransientStatus, TreeEntry,
};

/// How long `close` waits for the last save before giving up on it.
pub const CLOSE_FLUSH_DEADLINE: Duration = Duration::from_secs(2);

const LOAD_FAILED: &str = "Failed to load workspace";
const OPEN_FAILED: &str = "Failed to open document";
const CREATE_FAILED: &str = "Failed to create document";
const DELETE_FAILED: &str = "Failed to delete document";
const RENAME_FAILED: &str = "Failed to rename document";
const RENAME_COMMIT_FAILED: &str = "Failed to commit rename";

/// A live workspace: the open document, its unsaved edits, and every timer.
pub struct WorkspaceSession<B> {
    id: String,
    ctx: WorkspaceContext<B>,
    saver: SaveCoordinator<B>,
    remote: RemoteSyncOrchestrator<B>,
    autosave: Mutex<AutosaveScheduler>,
    poller: Mutex<BackgroundReconciliationPoller>,
    auto_sync: Mutex<AutoSyncConfig>,
    closed: AtomicBool,
}

impl<B: WorkspaceBackend> WorkspaceSession<B> {
    pub fn new(backend: B, auto_sync: AutoSyncConfig) -> Self {
        let ctx = WorkspaceContext::new(backend);
        let saver = SaveCoordinator::new(ctx.clone());
        let remote = RemoteSyncOrchestrator::new(ctx.clone(), saver.clone());
        let id = format!("ws_{}", &Uuid::new_v4().simple().to_string()[..12]);
        debug!(session = %id, provider = %ctx.backend.provider(), "Session created");

        Self {
            id,
            ctx,
            saver,
            remote,
            autosave: Mutex::new(AutosaveScheduler::new()),
            poller: Mutex::new(BackgroundReconciliationPoller::new()),
            auto_sync: Mutex::new(auto_sync),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.ctx.backend.provider()
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.ctx.backend
    }

    #[must_use]
    pub fn state(&self) -> &WorkspaceState {
        &self.ctx.state
    }

    /// Receiver for the displayed transient status.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TransientStatus> {
        self.ctx.status.subscribe()
    }

    #[must_use]
    pub fn transient_status(&self) -> TransientStatus {
        self.ctx.status.current()
    }

    #[must_use]
    pub fn sync_status(&self) -> Option<SyncStatus> {
        self.ctx.state.sync_status()
    }

    #[must_use]
    pub fn tree(&self) -> Vec<TreeEntry> {
        self.ctx.state.tree()
    }

    pub async fn open_document(&self) -> Option<OpenDocument> {
        self.ctx.open_document().await
    }

    /// Unsaved content buffered for `path`.
    pub async fn buffered(&self, path: &str) -> Option<String> {
        self.ctx.state.cache.lock().await.get(path).map(str::to_string)
    }

    pub async fn auto_sync(&self) -> AutoSyncConfig {
        *self.auto_sync.lock().await
    }

    pub async fn is_polling(&self) -> bool {
        self.poller.lock().await.is_running()
    }

    pub async fn is_autosave_pending(&self) -> bool {
        self.autosave.lock().await.is_pending()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Read tree and status, then start background reconciliation if eligible.
    pub async fn load(&self) -> ActionOutcome {
        let result = async {
            self.ctx.refresh_tree().await?;
            self.ctx.refresh_status().await
        }
        .await;

        self.reevaluate_poller().await;

        match result {
            Ok(status) => {
                info!(
                    session = %self.id,
                    provider = %status.provider,
                    documents = self.tree().iter().map(TreeEntry::document_count).sum::<usize>(),
                    "Workspace loaded"
                );
                ActionOutcome::Done
            }
            Err(e) => self.fail(e.message_or(LOAD_FAILED)).await,
        }
    }

    /// Select `path` for editing.
    ///
    /// Unsaved edits from earlier in the session win over the stored copy.
    pub async fn open(&self, path: &str) -> ApiResult<OpenDocument> {
        self.autosave.lock().await.cancel();

        match self.ctx.select_document(path).await {
            Ok(document) => {
                debug!(path, dirty = document.dirty, "Document opened");
                if document.dirty && !document.content.is_empty() {
                    let task = self.autosave_task();
                    self.autosave.lock().await.schedule(task);
                }
                Ok(document)
            }
            Err(e) => {
                self.fail(e.message_or(OPEN_FAILED)).await;
                Err(e)
            }
        }
    }

    /// Create an empty document and open it.
    pub async fn create(&self, path: &str) -> ApiResult<OpenDocument> {
        if let Err(e) = self.ctx.backend.save(path, "").await {
            self.fail(e.message_or(CREATE_FAILED)).await;
            return Err(e);
        }
        self.ctx.refresh_quietly().await;
        self.open(path).await
    }

    /// Replace the open document's content with `content`.
    ///
    /// Buffers the edit and re-arms autosave. Returns `false` if no document
    /// is open or the session is closed.
    pub async fn edit(&self, content: &str) -> bool {
        if self.is_closed() {
            return false;
        }

        let path = {
            let mut document = self.ctx.state.document.lock().await;
            let Some(doc) = document.as_mut() else {
                return false;
            };
            doc.content = content.to_string();
            doc.dirty = true;
            doc.path.clone()
        };

        self.ctx.state.cache.lock().await.put(&path, content);

        let task = self.autosave_task();
        let mut autosave = self.autosave.lock().await;
        if content.is_empty() {
            autosave.cancel();
        } else {
            autosave.schedule(task);
        }
        true
    }

    /// Save the open document now.
    pub async fn save(&self) -> ActionOutcome {
        let Some(document) = self.ctx.open_document().await else {
            return ActionOutcome::Skipped;
        };
        self.autosave.lock().await.cancel();
        self.saver
            .save(&document.path, &document.content, false)
            .await
    }

    /// Commit-and-push (git) or sync (object storage).
    pub async fn commit_and_push(&self) -> ActionOutcome {
        self.remote.commit_and_push().await
    }

    pub async fn pull(&self) -> ActionOutcome {
        self.remote.run(RemoteAction::Pull).await
    }

    pub async fn fetch(&self) -> ActionOutcome {
        self.remote.run(RemoteAction::Fetch).await
    }

    pub async fn push(&self) -> ActionOutcome {
        self.remote.run(RemoteAction::Push).await
    }

    /// Delete `path`, dropping its unsaved edits and closing it if open.
    pub async fn delete_document(&self, path: &str) -> ActionOutcome {
        if let Err(e) = self.ctx.backend.delete(path).await {
            return self.fail(e.message_or(DELETE_FAILED)).await;
        }

        self.ctx.state.cache.lock().await.delete(path);
        let was_open = {
            let mut document = self.ctx.state.document.lock().await;
            let open = document.as_ref().is_some_and(|doc| doc.path == path);
            if open {
                *document = None;
            }
            open
        };
        if was_open {
            self.autosave.lock().await.cancel();
        }

        info!(path, "Document deleted");
        self.ctx.refresh_quietly().await;
        self.ctx
            .status
            .set(Phase::Saved, format!("Deleted {path}"), SAVED_REVERT)
            .await;
        ActionOutcome::Done
    }

    /// Rename `from` to `to`, carrying unsaved edits and the open document along.
    ///
    /// Git workspaces record the rename as a commit. If that commit fails the
    /// rename still stands and the failure is only reported.
    pub async fn rename_document(&self, from: &str, to: &str) -> ActionOutcome {
        if let Err(e) = self.ctx.backend.rename(from, to).await {
            return self.fail(e.message_or(RENAME_FAILED)).await;
        }

        self.ctx.state.cache.lock().await.rename(from, to);
        if let Some(doc) = self.ctx.state.document.lock().await.as_mut() {
            if doc.path == from {
                doc.path = to.to_string();
            }
        }
        info!(from, to, "Document renamed");

        if self.provider() == Provider::Git {
            let message = format!("Rename {from} to {to}");
            if let Err(e) = self.ctx.backend.commit_all(&message).await {
                let message = e.message_or(RENAME_COMMIT_FAILED);
                warn!(from, to, error = %message, "Rename commit failed; rename kept");
                self.ctx.refresh_quietly().await;
                self.ctx
                    .status
                    .set(Phase::Error, message, ERROR_REVERT)
                    .await;
                return ActionOutcome::Done;
            }
        }

        self.ctx.refresh_quietly().await;
        self.ctx
            .status
            .set(Phase::Saved, format!("Renamed to {to}"), SAVED_REVERT)
            .await;
        ActionOutcome::Done
    }

    /// Replace the auto-sync settings and start or stop polling to match.
    pub async fn apply_auto_sync(&self, config: AutoSyncConfig) {
        *self.auto_sync.lock().await = config;
        self.reevaluate_poller().await;
    }

    /// Flush the open document (bounded by `deadline`) and cancel every timer.
    ///
    /// Idempotent. The session rejects edits afterwards.
    pub async fn close(&self, deadline: Duration) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.autosave.lock().await.cancel();
        self.poller.lock().await.stop();

        let pending = self.ctx.open_document().await.filter(|doc| doc.dirty);
        if let Some(doc) = pending {
            let flush = self.saver.save(&doc.path, &doc.content, true);
            match tokio::time::timeout(deadline, flush).await {
                Ok(outcome) => debug!(path = %doc.path, ?outcome, "Final save"),
                Err(_) => warn!(
                    path = %doc.path,
                    deadline_ms = deadline.as_millis(),
                    "Final save did not finish before close"
                ),
            }
        }

        self.ctx.status.cancel_revert().await;
        info!(session = %self.id, "Session closed");
    }

    async fn reevaluate_poller(&self) {
        let config = *self.auto_sync.lock().await;
        let mut poller = self.poller.lock().await;
        if self.is_closed() {
            poller.stop();
            return;
        }
        poller.reconfigure(self.provider(), config, &self.ctx);
    }

    async fn fail(&self, message: String) -> ActionOutcome {
        warn!(session = %self.id, error = %message, "Action failed");
        self.ctx
            .status
            .set(Phase::Error, message.clone(), ERROR_REVERT)
            .await;
        ActionOutcome::Failed(message)
    }

    /// The save an autosave timer runs: whatever the open document holds at fire time.
    fn autosave_task(&self) -> impl Future<Output = ()> + Send + 'static {
        let ctx = self.ctx.clone();
        let saver = self.saver.clone();
        async move {
            let pending = ctx
                .open_document()
                .await
                .filter(|doc| doc.dirty && !doc.content.is_empty());
            if let Some(doc) = pending {
                saver.save(&doc.path, &doc.content, true).await;
            }
        }
    }
}
