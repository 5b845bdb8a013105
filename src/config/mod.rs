//! Configuration management.
//!
//! Settings come from three places, highest priority first:
//!
//! 1. Command-line flags (`--workspace`, `--provider`)
//! 2. Environment variables (`NOTESYNC_*`)
//! 3. The global config file (`~/.notesync/config.json`)
//!
//! Whatever is still unset falls back to detection: the workspace root
//! defaults to the current directory, and the provider is read off the root
//! (a `.git` directory means git, a configured bucket means object storage,
//! anything else is a local folder).

mod file;

pub use file::{
    NotesyncConfig, WorkspaceSettings, config_path, load_config, load_config_from, save_config,
    save_config_to,
};

use std::path::{Path, PathBuf};

use crate::backend::BackendSettings;
use crate::error::{Error, Result};
use crate::model::{AutoSyncConfig, Provider};

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "NOTESYNC_CONFIG";
/// Overrides the workspace root.
pub const WORKSPACE_ENV: &str = "NOTESYNC_WORKSPACE";
/// Overrides `autoSync.enabled`.
pub const AUTO_SYNC_ENV: &str = "NOTESYNC_AUTO_SYNC";
/// Overrides `autoSync.intervalSeconds`.
pub const AUTO_SYNC_INTERVAL_ENV: &str = "NOTESYNC_AUTO_SYNC_INTERVAL";

/// Get the global notesync directory (`~/.notesync`).
#[must_use]
pub fn global_notesync_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".notesync"))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Resolve the workspace root.
///
/// Priority: explicit flag > `NOTESYNC_WORKSPACE` > config > current directory.
pub fn resolve_workspace_root(explicit: Option<&Path>, config: &NotesyncConfig) -> Result<PathBuf> {
    resolve_workspace_root_with(explicit, config, env_var)
}

fn resolve_workspace_root_with(
    explicit: Option<&Path>,
    config: &NotesyncConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env(WORKSPACE_ENV) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = &config.workspace.root {
        return Ok(path.clone());
    }
    Ok(std::env::current_dir()?)
}

/// Guess the provider from what is on disk.
#[must_use]
pub fn detect_provider(root: &Path, bucket_configured: bool) -> Provider {
    if root.join(".git").exists() {
        Provider::Git
    } else if bucket_configured {
        Provider::ObjectStorage
    } else {
        Provider::Local
    }
}

/// Resolve the provider: explicit flag > config > detection.
#[must_use]
pub fn resolve_provider(explicit: Option<Provider>, config: &NotesyncConfig, root: &Path) -> Provider {
    explicit
        .or(config.workspace.provider)
        .unwrap_or_else(|| detect_provider(root, config.workspace.bucket.is_some()))
}

/// Everything needed to open the backend.
pub fn resolve_backend_settings(
    explicit_root: Option<&Path>,
    explicit_provider: Option<Provider>,
    config: &NotesyncConfig,
) -> Result<BackendSettings> {
    let root = resolve_workspace_root(explicit_root, config)?;
    let provider = resolve_provider(explicit_provider, config, &root);
    tracing::debug!(root = %root.display(), %provider, "Resolved workspace");
    Ok(BackendSettings {
        root,
        provider,
        bucket: config.workspace.bucket.clone(),
    })
}

/// Resolve auto-sync settings: environment > config > default.
pub fn resolve_auto_sync(config: &NotesyncConfig) -> Result<AutoSyncConfig> {
    resolve_auto_sync_with(config, env_var)
}

fn resolve_auto_sync_with(
    config: &NotesyncConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AutoSyncConfig> {
    let mut auto_sync = config.auto_sync;

    if let Some(value) = env(AUTO_SYNC_ENV) {
        auto_sync.enabled = parse_bool(&value).ok_or_else(|| {
            Error::Config(format!("{AUTO_SYNC_ENV} must be true or false, got '{value}'"))
        })?;
    }

    if let Some(value) = env(AUTO_SYNC_INTERVAL_ENV) {
        let seconds = value.trim().parse::<u64>().map_err(|_| {
            Error::Config(format!(
                "{AUTO_SYNC_INTERVAL_ENV} must be a whole number of seconds, got '{value}'"
            ))
        })?;
        auto_sync.interval_seconds = Some(seconds);
    }

    Ok(auto_sync)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_global_notesync_dir_returns_some() {
        let dir = global_notesync_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().ends_with(".notesync"));
    }

    #[test]
    fn test_workspace_root_priority() {
        let config = NotesyncConfig {
            workspace: WorkspaceSettings {
                root: Some(PathBuf::from("/from/config")),
                ..WorkspaceSettings::default()
            },
            ..NotesyncConfig::default()
        };
        let env = env_from(&[(WORKSPACE_ENV, "/from/env")]);

        let root = resolve_workspace_root_with(Some(Path::new("/from/flag")), &config, &env);
        assert_eq!(root.unwrap(), PathBuf::from("/from/flag"));

        let root = resolve_workspace_root_with(None, &config, &env);
        assert_eq!(root.unwrap(), PathBuf::from("/from/env"));

        let root = resolve_workspace_root_with(None, &config, env_from(&[]));
        assert_eq!(root.unwrap(), PathBuf::from("/from/config"));
    }

    #[test]
    fn test_detect_provider() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect_provider(dir.path(), false), Provider::Local);
        assert_eq!(detect_provider(dir.path(), true), Provider::ObjectStorage);

        std::fs::create_dir(dir.path().join(".git")).unwrap();
        assert_eq!(detect_provider(dir.path(), true), Provider::Git);
    }

    #[test]
    fn test_explicit_provider_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = NotesyncConfig::default();
        config.workspace.provider = Some(Provider::Git);

        assert_eq!(resolve_provider(None, &config, dir.path()), Provider::Git);
        assert_eq!(
            resolve_provider(Some(Provider::Local), &config, dir.path()),
            Provider::Local
        );
    }

    #[test]
    fn test_auto_sync_env_overrides_config() {
        let mut config = NotesyncConfig::default();
        config.auto_sync = AutoSyncConfig::new(true, Some(60));

        let resolved = resolve_auto_sync_with(&config, env_from(&[])).unwrap();
        assert_eq!(resolved.effective_interval(), Duration::from_secs(60));

        let env = env_from(&[(AUTO_SYNC_ENV, "off"), (AUTO_SYNC_INTERVAL_ENV, "5")]);
        let resolved = resolve_auto_sync_with(&config, env).unwrap();
        assert!(!resolved.enabled);
        assert_eq!(resolved.interval_seconds, Some(5));
    }

    #[test]
    fn test_auto_sync_rejects_bad_env() {
        let config = NotesyncConfig::default();

        let err = resolve_auto_sync_with(&config, env_from(&[(AUTO_SYNC_ENV, "maybe")]));
        assert!(matches!(err, Err(Error::Config(_))));

        let err = resolve_auto_sync_with(&config, env_from(&[(AUTO_SYNC_INTERVAL_ENV, "soon")]));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("nah"), None);
    }
}
