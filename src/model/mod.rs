//! Data models for notesync.
//!
//! This module contains the workspace domain models:
//! - Provider (which kind of backing store a workspace uses)
//! - SyncStatus (snapshot of how far the workspace is from its remote)
//! - TransientStatus (the single user-visible action status)
//! - Documents (buffers, tree entries, commit outcomes)
//! - AutoSyncConfig (background reconciliation settings)

pub mod auto_sync;
pub mod document;
pub mod provider;
pub mod status;

pub use auto_sync::AutoSyncConfig;
pub use document::{CommitOutcome, DocumentBuffer, OpenDocument, TreeEntry};
pub use provider::Provider;
pub use status::{Phase, SyncStatus, TransientStatus};
