//! Command implementations.
//!
//! Commands are synchronous entry points. The ones that touch a workspace
//! build a current-thread runtime, open a [`WorkspaceSession`], and run the
//! session operation to completion.

pub mod completions;
pub mod config;
pub mod document;
pub mod remote;
pub mod status;
pub mod tree;
pub mod version;
pub mod watch;

use std::future::Future;

use crate::backend::{AnyBackend, open_backend};
use crate::cli::Target;
use crate::config::{load_config, resolve_auto_sync, resolve_backend_settings};
use crate::error::{ApiError, Error, Result};
use crate::model::{AutoSyncConfig, TreeEntry};
use crate::workspace::{ActionOutcome, WorkspaceSession};

/// Run `future` on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    Ok(rt.block_on(future))
}

/// Open the workspace selected by `target` and load its tree and status.
///
/// One-shot commands pass `poll = false`: background reconciliation only
/// makes sense for a long-running process like `watch`.
pub(crate) async fn open_session(target: Target<'_>, poll: bool) -> Result<WorkspaceSession<AnyBackend>> {
    let config = load_config()?;
    let settings = resolve_backend_settings(target.workspace, target.provider, &config)?;
    let auto_sync = if poll {
        resolve_auto_sync(&config)?
    } else {
        AutoSyncConfig::new(false, None)
    };

    let backend = open_backend(&settings)?;
    let session = WorkspaceSession::new(backend, auto_sync);
    check(session.load().await)?;
    Ok(session)
}

/// Turn a session outcome into a command result. `Ok(false)` means skipped.
pub(crate) fn check(outcome: ActionOutcome) -> Result<bool> {
    match outcome {
        ActionOutcome::Done => Ok(true),
        ActionOutcome::Skipped => Ok(false),
        ActionOutcome::Failed(message) => Err(Error::Backend(ApiError::new(message))),
    }
}

/// Reject paths that escape the workspace or name hidden files.
pub(crate) fn validate_path(path: &str) -> Result<()> {
    crate::backend::files::validate_document_path(path)
        .map_err(|e| Error::InvalidPath(e.message_or(path)))
}

/// Fail with `DocumentNotFound` unless the loaded tree holds `path`.
pub(crate) fn require_document(session: &WorkspaceSession<AnyBackend>, path: &str) -> Result<()> {
    validate_path(path)?;
    let tree = session.tree();
    match TreeEntry::find(&tree, path) {
        Some(entry) if !entry.is_dir => Ok(()),
        _ => Err(Error::DocumentNotFound {
            path: path.to_string(),
        }),
    }
}
