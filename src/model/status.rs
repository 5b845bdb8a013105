//! Status models: the remote sync snapshot and the transient action status.

use serde::{Deserialize, Serialize};

use super::Provider;

/// Snapshot of how the workspace relates to its remote.
///
/// Always replaced wholesale on a successful refresh, never patched field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub provider: Provider,
    /// Local commits not yet on the remote (git).
    pub ahead_count: u32,
    /// Remote commits not yet merged locally (git).
    pub behind_count: u32,
    /// Working tree has uncommitted changes.
    pub has_uncommitted: bool,
    /// Documents that differ from the remote copy (object storage).
    pub pending_push_count: u32,
    /// The remote holds changes the local copy does not have.
    pub needs_pull: bool,
}

impl SyncStatus {
    /// A clean status for `provider`.
    #[must_use]
    pub const fn clean(provider: Provider) -> Self {
        Self {
            provider,
            ahead_count: 0,
            behind_count: 0,
            has_uncommitted: false,
            pending_push_count: 0,
            needs_pull: false,
        }
    }

    /// Whether anything is waiting to go out or come in.
    #[must_use]
    pub const fn is_in_sync(&self) -> bool {
        self.ahead_count == 0
            && self.behind_count == 0
            && !self.has_uncommitted
            && self.pending_push_count == 0
            && !self.needs_pull
    }
}

/// Phase of the user-visible action status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Saving => write!(f, "saving"),
            Self::Saved => write!(f, "saved"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The one status shown to the user at any moment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientStatus {
    pub phase: Phase,
    pub message: String,
}

impl TransientStatus {
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
        }
    }

    /// Idle with no message.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_status_is_in_sync() {
        let status = SyncStatus::clean(Provider::Git);
        assert!(status.is_in_sync());

        let ahead = SyncStatus {
            ahead_count: 2,
            ..status
        };
        assert!(!ahead.is_in_sync());
    }

    #[test]
    fn test_sync_status_json_is_camel_case() {
        let json = serde_json::to_value(SyncStatus::clean(Provider::ObjectStorage)).unwrap();
        assert_eq!(json["provider"], "s3");
        assert_eq!(json["pendingPushCount"], 0);
        assert_eq!(json["needsPull"], false);
    }

    #[test]
    fn test_transient_status_default_is_idle() {
        let status = TransientStatus::default();
        assert_eq!(status.phase, Phase::Idle);
        assert!(status.message.is_empty());
    }
}
