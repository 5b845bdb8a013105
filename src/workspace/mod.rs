//! Workspace synchronization core.
//!
//! Decides when edits are buffered, when they are written to the backing
//! store, when they are reconciled with a remote, and how each outcome is
//! shown to the user:
//!
//! ```text
//!  edit ──▶ ContentCache ──▶ AutosaveScheduler ─┐
//!                                               ▼
//!  save / sync ───────────────────────────▶ SaveCoordinator ──┐
//!       │                                                     ▼
//!       └──▶ RemoteSyncOrchestrator ────────────▶ TransientStatusController
//!
//!  BackgroundReconciliationPoller ──▶ sync status + tree (object storage only)
//! ```
//!
//! Everything is owned by one [`WorkspaceSession`]. Each of the three timer
//! kinds (autosave debounce, status revert, poll interval) lives in a single
//! [`timer::TimerSlot`], so superseding or tearing down always cancels.

pub mod autosave;
pub mod cache;
pub mod poller;
pub mod remote;
pub mod save;
pub mod session;
pub mod state;
pub mod status;
pub mod timer;

#[cfg(test)]
pub(crate) mod mock;

pub use autosave::{AUTOSAVE_DELAY, AutosaveScheduler};
pub use cache::ContentCache;
pub use poller::{BackgroundReconciliationPoller, PollStopHandle};
pub use remote::{RemoteAction, RemoteSyncOrchestrator};
pub use save::{ActionOutcome, SaveCoordinator};
pub use session::{CLOSE_FLUSH_DEADLINE, WorkspaceSession};
pub use state::{WorkspaceContext, WorkspaceState};
pub use status::TransientStatusController;
