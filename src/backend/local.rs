//! Local-only workspace: a folder of notes with no remote.

use std::path::Path;

use super::{DocumentStore, WorkspaceBackend, blocking, no_remote};
use crate::error::ApiResult;
use crate::model::{CommitOutcome, Provider, SyncStatus, TreeEntry};

/// Backend for a plain folder.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    store: DocumentStore,
}

impl LocalBackend {
    pub fn new(root: &Path) -> Self {
        Self {
            store: DocumentStore::new(root),
        }
    }

    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

impl WorkspaceBackend for LocalBackend {
    fn provider(&self) -> Provider {
        Provider::Local
    }

    async fn save(&self, path: &str, content: &str) -> ApiResult<()> {
        let store = self.store.clone();
        let (path, content) = (path.to_string(), content.to_string());
        blocking(move || store.write(&path, &content)).await
    }

    async fn read(&self, path: &str) -> ApiResult<String> {
        let store = self.store.clone();
        let path = path.to_string();
        blocking(move || store.read(&path)).await
    }

    async fn status(&self) -> ApiResult<SyncStatus> {
        Ok(SyncStatus::clean(Provider::Local))
    }

    async fn list_tree(&self) -> ApiResult<Vec<TreeEntry>> {
        let store = self.store.clone();
        blocking(move || store.list_tree()).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let store = self.store.clone();
        let path = path.to_string();
        blocking(move || store.delete(&path)).await
    }

    async fn rename(&self, from: &str, to: &str) -> ApiResult<()> {
        let store = self.store.clone();
        let (from, to) = (from.to_string(), to.to_string());
        blocking(move || store.rename(&from, &to)).await
    }

    async fn commit_all(&self, _message: &str) -> ApiResult<CommitOutcome> {
        Err(no_remote(Provider::Local))
    }

    async fn commit_and_push_all(&self) -> ApiResult<CommitOutcome> {
        Err(no_remote(Provider::Local))
    }

    async fn push(&self) -> ApiResult<()> {
        Err(no_remote(Provider::Local))
    }

    async fn pull(&self) -> ApiResult<()> {
        Err(no_remote(Provider::Local))
    }

    async fn fetch(&self) -> ApiResult<()> {
        Err(no_remote(Provider::Local))
    }

    async fn start_auto_push(&self) -> ApiResult<()> {
        Ok(())
    }
}
