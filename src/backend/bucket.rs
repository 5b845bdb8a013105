//! Object-storage workspace.
//!
//! The bucket is addressed as a directory of objects keyed by document path
//! (a mounted bucket or a local mirror of one). There is no commit history:
//! push uploads every document whose SHA256 differs from the stored object,
//! pull downloads objects that differ locally. When both sides changed, the
//! newer modification time wins, so an unpushed local edit is never clobbered
//! by an older object.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info};

use super::files::atomic_write;
use super::hash::{content_hash, has_changed};
use super::{DocumentStore, WorkspaceBackend, blocking};
use crate::error::{ApiError, ApiResult};
use crate::model::{CommitOutcome, Provider, SyncStatus, TreeEntry};

/// Backend for a working copy mirrored to an object-storage bucket.
#[derive(Debug, Clone)]
pub struct BucketBackend {
    store: DocumentStore,
    bucket: DocumentStore,
}

/// Hash and modification time of one document or object.
#[derive(Debug, Clone)]
struct ObjectState {
    hash: String,
    modified: SystemTime,
}

/// Transfers needed to reconcile the working copy with the bucket.
#[derive(Debug, Default, PartialEq, Eq)]
struct TransferPlan {
    upload: Vec<String>,
    download: Vec<String>,
}

impl BucketBackend {
    pub fn new(root: &Path, bucket: impl Into<PathBuf>) -> Self {
        Self {
            store: DocumentStore::new(root),
            bucket: DocumentStore::new(bucket.into()),
        }
    }

    async fn plan(&self) -> ApiResult<TransferPlan> {
        let (store, bucket) = (self.store.clone(), self.bucket.clone());
        blocking(move || {
            let local = scan(&store)?;
            let remote = scan(&bucket)?;
            Ok(plan_transfers(&local, &remote))
        })
        .await
    }
}

impl WorkspaceBackend for BucketBackend {
    fn provider(&self) -> Provider {
        Provider::ObjectStorage
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
        let plan = self.plan().await?;
        Ok(SyncStatus {
            pending_push_count: u32::try_from(plan.upload.len()).unwrap_or(u32::MAX),
            needs_pull: !plan.download.is_empty(),
            ..SyncStatus::clean(Provider::ObjectStorage)
        })
    }

    async fn list_tree(&self) -> ApiResult<Vec<TreeEntry>> {
        let store = self.store.clone();
        blocking(move || store.list_tree()).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let (store, bucket) = (self.store.clone(), self.bucket.clone());
        let path = path.to_string();
        blocking(move || {
            store.delete(&path)?;
            let object = bucket.resolve(&path)?;
            if object.exists() {
                bucket.delete(&path)?;
            }
            Ok(())
        })
        .await
    }

    async fn rename(&self, from: &str, to: &str) -> ApiResult<()> {
        let (store, bucket) = (self.store.clone(), self.bucket.clone());
        let (from, to) = (from.to_string(), to.to_string());
        blocking(move || {
            store.rename(&from, &to)?;
            if bucket.resolve(&from)?.exists() {
                bucket.rename(&from, &to)?;
            }
            Ok(())
        })
        .await
    }

    async fn commit_all(&self, _message: &str) -> ApiResult<CommitOutcome> {
        Err(ApiError::new("Commit is not supported for object storage"))
    }

    async fn commit_and_push_all(&self) -> ApiResult<CommitOutcome> {
        Err(ApiError::new("Commit is not supported for object storage"))
    }

    async fn push(&self) -> ApiResult<()> {
        let plan = self.plan().await?;
        let count = plan.upload.len();
        let (store, bucket) = (self.store.clone(), self.bucket.clone());
        blocking(move || {
            fs::create_dir_all(bucket.root())?;
            for path in &plan.upload {
                copy_object(&store, &bucket, path)?;
            }
            Ok(())
        })
        .await?;
        info!(uploaded = count, "Pushed to bucket");
        Ok(())
    }

    async fn pull(&self) -> ApiResult<()> {
        let plan = self.plan().await?;
        let count = plan.download.len();
        let (store, bucket) = (self.store.clone(), self.bucket.clone());
        blocking(move || {
            for path in &plan.download {
                copy_object(&bucket, &store, path)?;
            }
            Ok(())
        })
        .await?;
        info!(downloaded = count, "Pulled from bucket");
        Ok(())
    }

    async fn fetch(&self) -> ApiResult<()> {
        // Listing the bucket is the whole of a fetch; status recomputes it.
        let bucket = self.bucket.clone();
        blocking(move || scan(&bucket).map(drop)).await
    }

    async fn start_auto_push(&self) -> ApiResult<()> {
        debug!(bucket = %self.bucket.root().display(), "Auto-sync announced");
        Ok(())
    }
}

/// Hash every document under a store. A missing root is an empty bucket.
fn scan(store: &DocumentStore) -> ApiResult<HashMap<String, ObjectState>> {
    let mut objects = HashMap::new();
    if !store.root().exists() {
        return Ok(objects);
    }
    for path in store.list_files()? {
        let abs = store.resolve(&path)?;
        let bytes = fs::read(&abs)?;
        let modified = fs::metadata(&abs)?.modified()?;
        objects.insert(
            path,
            ObjectState {
                hash: content_hash(&bytes),
                modified,
            },
        );
    }
    Ok(objects)
}

/// Decide which side each differing document should flow to.
fn plan_transfers(
    local: &HashMap<String, ObjectState>,
    remote: &HashMap<String, ObjectState>,
) -> TransferPlan {
    let paths: BTreeSet<&String> = local.keys().chain(remote.keys()).collect();
    let mut plan = TransferPlan::default();

    for path in paths {
        let stored = remote.get(path);
        let Some(l) = local.get(path) else {
            if stored.is_some() {
                plan.download.push(path.clone());
            }
            continue;
        };
        if !has_changed(&l.hash, stored.map(|r| r.hash.as_str())) {
            continue;
        }
        match stored {
            Some(r) if l.modified < r.modified => plan.download.push(path.clone()),
            _ => plan.upload.push(path.clone()),
        }
    }

    plan
}

fn copy_object(from: &DocumentStore, to: &DocumentStore, path: &str) -> ApiResult<()> {
    let bytes = fs::read(from.resolve(path)?)?;
    atomic_write(&to.resolve(path)?, &bytes)?;
    Ok(())
}
