//! The global config file.
//!
//! Lives at `~/.notesync/config.json` unless `NOTESYNC_CONFIG` points
//! elsewhere. A missing file is the same as an empty one.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{CONFIG_ENV, global_notesync_dir};
use crate::error::{Error, Result};
use crate::model::{AutoSyncConfig, Provider};

/// Everything the config file can hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesyncConfig {
    #[serde(default)]
    pub workspace: WorkspaceSettings,
    #[serde(default)]
    pub auto_sync: AutoSyncConfig,
}

/// Which workspace to open and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Explicit provider; detected from the root when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    /// Bucket directory for object storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<PathBuf>,
}

/// Get the config file path.
pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    global_notesync_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or(Error::Config("Could not determine home directory".into()))
}

/// Load the config file.
pub fn load_config() -> Result<NotesyncConfig> {
    load_config_from(&config_path()?)
}

/// Load a config file from `path`.
pub fn load_config_from(path: &Path) -> Result<NotesyncConfig> {
    if !path.exists() {
        return Ok(NotesyncConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Save the config file.
pub fn save_config(config: &NotesyncConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

/// Save a config file to `path`, creating its directory.
pub fn save_config_to(path: &Path, config: &NotesyncConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

    fs::write(path, content)
        .map_err(|e| Error::Config(format!("Failed to write config file: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, NotesyncConfig::default());
        assert!(config.auto_sync.enabled);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = NotesyncConfig {
            workspace: WorkspaceSettings {
                root: Some(PathBuf::from("/notes")),
                provider: Some(Provider::ObjectStorage),
                bucket: Some(PathBuf::from("/mnt/bucket")),
            },
            auto_sync: AutoSyncConfig::new(false, Some(45)),
        };

        save_config_to(&path, &config).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"autoSync\""));
        assert!(raw.contains("\"intervalSeconds\": 45"));
        assert!(raw.contains("\"provider\": \"s3\""));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"workspace":{"provider":"git"}}"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.workspace.provider, Some(Provider::Git));
        assert_eq!(config.workspace.root, None);
        assert_eq!(config.auto_sync, AutoSyncConfig::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
