//! Shared workspace state.
//!
//! The pieces of the session that more than one controller reads or writes:
//! the unsaved-content cache, the open document, and the latest status and
//! tree snapshots. Snapshots are published through `watch` channels and are
//! always replaced wholesale.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use super::cache::ContentCache;
use super::status::TransientStatusController;
use crate::backend::WorkspaceBackend;
use crate::error::ApiResult;
use crate::model::{OpenDocument, SyncStatus, TreeEntry};

/// State owned by one workspace session.
pub struct WorkspaceState {
    pub(crate) cache: Mutex<ContentCache>,
    pub(crate) document: Mutex<Option<OpenDocument>>,
    sync_status: watch::Sender<Option<SyncStatus>>,
    tree: watch::Sender<Vec<TreeEntry>>,
}

impl WorkspaceState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(ContentCache::new()),
            document: Mutex::new(None),
            sync_status: watch::channel(None).0,
            tree: watch::channel(Vec::new()).0,
        }
    }

    #[must_use]
    pub fn sync_status(&self) -> Option<SyncStatus> {
        self.sync_status.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_sync_status(&self) -> watch::Receiver<Option<SyncStatus>> {
        self.sync_status.subscribe()
    }

    #[must_use]
    pub fn tree(&self) -> Vec<TreeEntry> {
        self.tree.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_tree(&self) -> watch::Receiver<Vec<TreeEntry>> {
        self.tree.subscribe()
    }

    pub(crate) fn replace_sync_status(&self, status: SyncStatus) {
        self.sync_status.send_replace(Some(status));
    }

    pub(crate) fn replace_tree(&self, tree: Vec<TreeEntry>) {
        self.tree.send_replace(tree);
    }
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a controller needs to talk to the backend and report back.
pub struct WorkspaceContext<B> {
    pub backend: Arc<B>,
    pub state: Arc<WorkspaceState>,
    pub status: TransientStatusController,
}

impl<B> Clone for WorkspaceContext<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
            status: self.status.clone(),
        }
    }
}

impl<B: WorkspaceBackend> WorkspaceContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            state: Arc::new(WorkspaceState::new()),
            status: TransientStatusController::new(),
        }
    }

    /// Fetch and publish the sync status.
    pub async fn refresh_status(&self) -> ApiResult<SyncStatus> {
        let status = self.backend.status().await?;
        self.state.replace_sync_status(status.clone());
        Ok(status)
    }

    /// Fetch and publish the document tree.
    pub async fn refresh_tree(&self) -> ApiResult<()> {
        let tree = self.backend.list_tree().await?;
        self.state.replace_tree(tree);
        Ok(())
    }

    /// Refresh status and tree, logging failures instead of returning them.
    ///
    /// Used where a refresh is a follow-up to an action that already reported
    /// its own outcome.
    pub async fn refresh_quietly(&self) {
        if let Err(e) = self.refresh_status().await {
            warn!(error = %e, "Status refresh failed");
        }
        if let Err(e) = self.refresh_tree().await {
            warn!(error = %e, "Tree refresh failed");
        }
    }

    /// Load `path` into the editor.
    ///
    /// Buffered content wins over disk: if the cache holds unsaved edits for
    /// `path`, those are shown and the document is marked dirty.
    pub async fn select_document(&self, path: &str) -> ApiResult<OpenDocument> {
        let buffered = self.state.cache.lock().await.get(path).map(str::to_string);
        let document = match buffered {
            Some(content) => {
                debug!(path, "Restoring buffered content");
                OpenDocument {
                    path: path.to_string(),
                    content,
                    dirty: true,
                }
            }
            None => OpenDocument {
                path: path.to_string(),
                content: self.backend.read(path).await?,
                dirty: false,
            },
        };

        *self.state.document.lock().await = Some(document.clone());
        Ok(document)
    }

    /// Re-read the open document after the remote changed underneath it.
    pub async fn reload_open_document(&self) -> ApiResult<()> {
        let path = match self.state.document.lock().await.as_ref() {
            Some(doc) => doc.path.clone(),
            None => return Ok(()),
        };
        self.select_document(&path).await.map(drop)
    }

    /// The open document, if any.
    pub async fn open_document(&self) -> Option<OpenDocument> {
        self.state.document.lock().await.clone()
    }
}
