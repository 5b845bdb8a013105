//! Provider model.
//!
//! A provider is the kind of backing store behind a workspace. Sync behavior
//! branches on it everywhere, so it is a closed enum: adding a variant forces
//! every `match` in the workspace core to be revisited.

use serde::{Deserialize, Serialize};

/// Kind of remote backing store for a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Version-controlled working copy with a git remote.
    Git,
    /// Object-storage bucket. Serialized as `s3` to match existing configs.
    #[serde(rename = "s3", alias = "bucket", alias = "object-storage")]
    ObjectStorage,
    /// Local folder with no remote.
    Local,
}

impl Provider {
    /// Whether the provider has a remote to push to / pull from.
    #[must_use]
    pub const fn has_remote(&self) -> bool {
        !matches!(self, Self::Local)
    }

    /// Whether background reconciliation applies to this provider.
    ///
    /// Only object storage needs polling; git has explicit pull/fetch.
    #[must_use]
    pub const fn polls_remote(&self) -> bool {
        matches!(self, Self::ObjectStorage)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::ObjectStorage => write!(f, "s3"),
            Self::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "git" => Ok(Self::Git),
            "s3" | "bucket" | "object-storage" | "objectstorage" => Ok(Self::ObjectStorage),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown provider: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        assert_eq!("git".parse::<Provider>().unwrap(), Provider::Git);
        assert_eq!("S3".parse::<Provider>().unwrap(), Provider::ObjectStorage);
        assert_eq!("bucket".parse::<Provider>().unwrap(), Provider::ObjectStorage);
        assert_eq!("local".parse::<Provider>().unwrap(), Provider::Local);
        assert!("ftp".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_serde_matches_display() {
        for provider in [Provider::Git, Provider::ObjectStorage, Provider::Local] {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{provider}\""));
        }
    }

    #[test]
    fn test_only_object_storage_polls() {
        assert!(Provider::ObjectStorage.polls_remote());
        assert!(!Provider::Git.polls_remote());
        assert!(!Provider::Local.polls_remote());
        assert!(!Provider::Local.has_remote());
    }
}
