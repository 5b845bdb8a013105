//! Background reconciliation settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Poll interval used when none is configured (or zero is).
pub const DEFAULT_INTERVAL_SECONDS: u64 = 30;
/// Floor that keeps a tiny configured interval from polling in a tight loop.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Whether and how often an object-storage workspace re-reads its remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSyncConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Seconds between polls. Absent or zero means the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u64>,
}

const fn default_enabled() -> bool {
    true
}

impl Default for AutoSyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: None,
        }
    }
}

impl AutoSyncConfig {
    #[must_use]
    pub const fn new(enabled: bool, interval_seconds: Option<u64>) -> Self {
        Self {
            enabled,
            interval_seconds,
        }
    }

    /// The interval the poller actually runs at.
    #[must_use]
    pub fn effective_interval(&self) -> Duration {
        effective_interval(self.interval_seconds)
    }
}

/// `max(1s, (seconds or 30) * 1s)`.
#[must_use]
pub fn effective_interval(interval_seconds: Option<u64>) -> Duration {
    let seconds = match interval_seconds {
        None | Some(0) => DEFAULT_INTERVAL_SECONDS,
        Some(s) => s,
    };
    Duration::from_secs(seconds).max(MIN_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(seconds: Option<u64>) -> u128 {
        effective_interval(seconds).as_millis()
    }

    #[test]
    fn test_effective_interval() {
        assert_eq!(millis(None), 30_000);
        assert_eq!(millis(Some(0)), 30_000);
        assert_eq!(millis(Some(1)), 1_000);
        assert_eq!(millis(Some(5)), 5_000);
        assert_eq!(millis(Some(600)), 600_000);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: AutoSyncConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AutoSyncConfig::default());

        let config: AutoSyncConfig =
            serde_json::from_str(r#"{"enabled":false,"intervalSeconds":5}"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.effective_interval(), Duration::from_secs(5));
    }
}
