//! Backing stores for a notes workspace.
//!
//! The workspace core never touches disks or remotes directly. It calls the
//! operations of [`WorkspaceBackend`] and reacts to their outcomes:
//!
//! ```text
//! ┌──────────────────────┐
//! │  WorkspaceSession    │
//! │ (save/sync/poll)     │
//! └──────────┬───────────┘
//!            │ WorkspaceBackend
//!     ┌──────┼──────────┐
//!     ▼      ▼          ▼
//! ┌──────┐ ┌─────┐ ┌────────┐
//! │Local │ │ Git │ │ Bucket │
//! └──────┘ └─────┘ └────────┘
//!     │      │          │
//!     ▼      ▼          ▼
//!   files  git CLI   object dir
//! ```
//!
//! Every operation returns [`ApiResult`], so failure handling at the call
//! site is exhaustive.

pub mod bucket;
pub mod files;
pub mod git;
pub mod hash;
pub mod local;

use std::future::Future;
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult, Error, Result};
use crate::model::{CommitOutcome, Provider, SyncStatus, TreeEntry};

pub use bucket::BucketBackend;
pub use files::DocumentStore;
pub use git::GitBackend;
pub use local::LocalBackend;

/// Operations the workspace core performs against its backing store.
///
/// All methods are async. Implementations must be cheap to share behind an
/// `Arc`, since timers and pollers call them from spawned tasks.
pub trait WorkspaceBackend: Send + Sync + 'static {
    /// Which kind of store this is.
    fn provider(&self) -> Provider;

    /// Persist `content` at `path`.
    fn save(&self, path: &str, content: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// On-disk content of a document.
    fn read(&self, path: &str) -> impl Future<Output = ApiResult<String>> + Send;

    /// Current sync status.
    fn status(&self) -> impl Future<Output = ApiResult<SyncStatus>> + Send;

    /// Document hierarchy.
    fn list_tree(&self) -> impl Future<Output = ApiResult<Vec<TreeEntry>>> + Send;

    /// Remove a document.
    fn delete(&self, path: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// Move a document.
    fn rename(&self, from: &str, to: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// Record all working-copy changes (git only).
    fn commit_all(&self, message: &str)
    -> impl Future<Output = ApiResult<CommitOutcome>> + Send;

    /// Commit everything, then push (git only).
    fn commit_and_push_all(&self) -> impl Future<Output = ApiResult<CommitOutcome>> + Send;

    /// Send local changes to the remote. Doubles as "sync" for object storage.
    fn push(&self) -> impl Future<Output = ApiResult<()>> + Send;

    /// Bring remote changes into the working copy.
    fn pull(&self) -> impl Future<Output = ApiResult<()>> + Send;

    /// Refresh knowledge of the remote without touching the working copy.
    fn fetch(&self) -> impl Future<Output = ApiResult<()>> + Send;

    /// Warm-up call made when background reconciliation starts.
    fn start_auto_push(&self) -> impl Future<Output = ApiResult<()>> + Send;
}

/// Run blocking filesystem work off the async executor.
pub(crate) async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::new(format!("Background task failed: {e}")))?
}

/// Error returned by remote operations on a store that has none.
pub(crate) fn no_remote(provider: Provider) -> ApiError {
    match provider {
        Provider::Local => ApiError::new("Local workspaces have no remote"),
        Provider::Git | Provider::ObjectStorage => {
            ApiError::new(format!("No remote configured for {provider}"))
        }
    }
}

/// Where and how to open a workspace.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub root: PathBuf,
    pub provider: Provider,
    /// Bucket location, required for object storage.
    pub bucket: Option<PathBuf>,
}

/// A backend chosen at runtime.
///
/// The trait uses `impl Future` returns and is not object-safe, so runtime
/// selection goes through this enum instead of `Box<dyn ..>`.
#[derive(Debug, Clone)]
pub enum AnyBackend {
    Local(LocalBackend),
    Git(GitBackend),
    Bucket(BucketBackend),
}

/// Open the backend described by `settings`.
///
/// # Errors
///
/// Returns an error if the workspace root does not exist, or if object
/// storage is selected without a bucket.
pub fn open_backend(settings: &BackendSettings) -> Result<AnyBackend> {
    if !settings.root.is_dir() {
        return Err(Error::WorkspaceNotFound {
            path: settings.root.clone(),
        });
    }

    let backend = match settings.provider {
        Provider::Local => AnyBackend::Local(LocalBackend::new(&settings.root)),
        Provider::Git => AnyBackend::Git(GitBackend::new(&settings.root)),
        Provider::ObjectStorage => {
            let bucket = settings.bucket.clone().ok_or_else(|| {
                Error::Config("object storage needs a bucket (workspace.bucket)".to_string())
            })?;
            AnyBackend::Bucket(BucketBackend::new(&settings.root, bucket))
        }
    };

    tracing::debug!(provider = %settings.provider, root = %settings.root.display(), "Opened backend");
    Ok(backend)
}

macro_rules! delegate {
    ($self:ident, $b:ident => $call:expr) => {
        match $self {
            AnyBackend::Local($b) => $call,
            AnyBackend::Git($b) => $call,
            AnyBackend::Bucket($b) => $call,
        }
    };
}

impl WorkspaceBackend for AnyBackend {
    fn provider(&self) -> Provider {
        delegate!(self, b => b.provider())
    }

    async fn save(&self, path: &str, content: &str) -> ApiResult<()> {
        delegate!(self, b => b.save(path, content).await)
    }

    async fn read(&self, path: &str) -> ApiResult<String> {
        delegate!(self, b => b.read(path).await)
    }

    async fn status(&self) -> ApiResult<SyncStatus> {
        delegate!(self, b => b.status().await)
    }

    async fn list_tree(&self) -> ApiResult<Vec<TreeEntry>> {
        delegate!(self, b => b.list_tree().await)
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        delegate!(self, b => b.delete(path).await)
    }

    async fn rename(&self, from: &str, to: &str) -> ApiResult<()> {
        delegate!(self, b => b.rename(from, to).await)
    }

    async fn commit_all(&self, message: &str) -> ApiResult<CommitOutcome> {
        delegate!(self, b => b.commit_all(message).await)
    }

    async fn commit_and_push_all(&self) -> ApiResult<CommitOutcome> {
        delegate!(self, b => b.commit_and_push_all().await)
    }

    async fn push(&self) -> ApiResult<()> {
        delegate!(self, b => b.push().await)
    }

    async fn pull(&self) -> ApiResult<()> {
        delegate!(self, b => b.pull().await)
    }

    async fn fetch(&self) -> ApiResult<()> {
        delegate!(self, b => b.fetch().await)
    }

    async fn start_auto_push(&self) -> ApiResult<()> {
        delegate!(self, b => b.start_auto_push().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_backend_missing_root() {
        let settings = BackendSettings {
            root: PathBuf::from("/definitely/not/a/workspace"),
            provider: Provider::Local,
            bucket: None,
        };
        let err = open_backend(&settings).unwrap_err();
        assert!(matches!(err, Error::WorkspaceNotFound { .. }));
    }

    #[test]
    fn test_open_backend_bucket_required() {
        let temp = TempDir::new().unwrap();
        let settings = BackendSettings {
            root: temp.path().to_path_buf(),
            provider: Provider::ObjectStorage,
            bucket: None,
        };
        assert!(matches!(open_backend(&settings), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_any_backend_delegates() {
        let temp = TempDir::new().unwrap();
        let settings = BackendSettings {
            root: temp.path().to_path_buf(),
            provider: Provider::Local,
            bucket: None,
        };
        let backend = open_backend(&settings).unwrap();
        assert_eq!(backend.provider(), Provider::Local);

        backend.save("a.md", "hello").await.unwrap();
        assert_eq!(backend.read("a.md").await.unwrap(), "hello");
        assert!(backend.push().await.is_err());
    }
}
