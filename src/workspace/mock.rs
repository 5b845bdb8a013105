//! Scripted in-memory backend for workspace tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::WorkspaceBackend;
use crate::error::{ApiError, ApiResult};
use crate::model::{CommitOutcome, Provider, SyncStatus, TreeEntry};

/// Records every call and fails the ones it is told to.
pub struct MockBackend {
    provider: Provider,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    files: BTreeMap<String, String>,
    calls: Vec<String>,
    failures: HashMap<&'static str, ApiError>,
    nothing_to_commit: bool,
    save_delay: Duration,
}

impl MockBackend {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.set_file(path, content);
        self
    }

    /// Change a document behind the session's back (a remote edit).
    pub fn set_file(&self, path: &str, content: &str) {
        self.lock().files.insert(path.to_string(), content.to_string());
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).cloned()
    }

    /// Make the next call to `op` fail with `error`.
    pub fn fail_next(&self, op: &'static str, error: ApiError) {
        self.lock().failures.insert(op, error);
    }

    pub fn set_nothing_to_commit(&self, value: bool) {
        self.lock().nothing_to_commit = value;
    }

    /// Make every save take `delay` before it lands.
    pub fn set_save_delay(&self, delay: Duration) {
        self.lock().save_delay = delay;
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of calls whose name starts with `op`.
    pub fn count(&self, op: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.split(':').next() == Some(op))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn record(&self, op: &'static str, detail: Option<&str>) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.calls.push(match detail {
            Some(detail) => format!("{op}:{detail}"),
            None => op.to_string(),
        });
        inner.failures.remove(op).map_or(Ok(()), Err)
    }
}

impl WorkspaceBackend for MockBackend {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn save(&self, path: &str, content: &str) -> ApiResult<()> {
        self.record("save", Some(path))?;
        let delay = self.lock().save_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.set_file(path, content);
        Ok(())
    }

    async fn read(&self, path: &str) -> ApiResult<String> {
        self.record("read", Some(path))?;
        self.file(path)
            .ok_or_else(|| ApiError::new(format!("Document not found: {path}")))
    }

    async fn status(&self) -> ApiResult<SyncStatus> {
        self.record("status", None)?;
        Ok(SyncStatus::clean(self.provider))
    }

    async fn list_tree(&self) -> ApiResult<Vec<TreeEntry>> {
        self.record("tree", None)?;
        Ok(self.lock().files.keys().map(TreeEntry::file).collect())
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.record("delete", Some(path))?;
        self.lock().files.remove(path);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> ApiResult<()> {
        self.record("rename", Some(&format!("{from}->{to}")))?;
        let mut inner = self.lock();
        let content = inner
            .files
            .remove(from)
            .ok_or_else(|| ApiError::new(format!("Document not found: {from}")))?;
        inner.files.insert(to.to_string(), content);
        Ok(())
    }

    async fn commit_all(&self, message: &str) -> ApiResult<CommitOutcome> {
        self.record("commit_all", Some(message))?;
        Ok(CommitOutcome::Committed {
            message: message.to_string(),
        })
    }

    async fn commit_and_push_all(&self) -> ApiResult<CommitOutcome> {
        self.record("commit_and_push_all", None)?;
        if self.lock().nothing_to_commit {
            Ok(CommitOutcome::NothingToCommit)
        } else {
            Ok(CommitOutcome::Committed {
                message: "Update notes".to_string(),
            })
        }
    }

    async fn push(&self) -> ApiResult<()> {
        self.record("push", None)
    }

    async fn pull(&self) -> ApiResult<()> {
        self.record("pull", None)
    }

    async fn fetch(&self) -> ApiResult<()> {
        self.record("fetch", None)
    }

    async fn start_auto_push(&self) -> ApiResult<()> {
        self.record("start_auto_push", None)
    }
}
