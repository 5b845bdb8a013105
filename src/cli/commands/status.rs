//! Status command implementation.

use colored::Colorize;
use serde::Serialize;

use super::{block_on, open_session};
use crate::cli::Target;
use crate::config::{load_config, resolve_auto_sync};
use crate::error::Result;
use crate::model::{AutoSyncConfig, Provider, SyncStatus, TreeEntry};

/// Output for status command.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput {
    session: String,
    provider: Provider,
    documents: usize,
    sync: Option<SyncStatus>,
    in_sync: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_sync: Option<AutoSyncConfig>,
}

/// Execute status command.
pub fn execute(target: Target<'_>, json: bool) -> Result<()> {
    block_on(run(target, json))?
}

async fn run(target: Target<'_>, json: bool) -> Result<()> {
    let session = open_session(target, false).await?;
    let provider = session.provider();
    let sync = session.sync_status();
    let documents = session.tree().iter().map(TreeEntry::document_count).sum();
    let auto_sync = if provider.polls_remote() {
        Some(resolve_auto_sync(&load_config()?)?)
    } else {
        None
    };

    if json {
        let output = StatusOutput {
            session: session.id().to_string(),
            provider,
            documents,
            in_sync: sync.as_ref().is_some_and(SyncStatus::is_in_sync),
            sync,
            auto_sync,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", "Workspace Status".bold());
    println!("================");
    println!();
    println!("Provider:  {provider}");
    println!("Documents: {documents}");
    if let Some(status) = &sync {
        println!("Sync:      {}", describe(status));
    }
    if let Some(auto_sync) = auto_sync {
        if auto_sync.enabled {
            println!(
                "Auto-sync: every {}s",
                auto_sync.effective_interval().as_secs()
            );
        } else {
            println!("Auto-sync: off");
        }
    }
    Ok(())
}

/// One-line, colored summary of a sync status.
pub(crate) fn describe(status: &SyncStatus) -> String {
    if status.is_in_sync() {
        return "up to date".green().to_string();
    }

    let mut parts = Vec::new();
    match status.provider {
        Provider::Git => {
            if status.ahead_count > 0 {
                parts.push(format!("{} ahead", status.ahead_count));
            }
            if status.behind_count > 0 {
                parts.push(format!("{} behind", status.behind_count));
            }
            if status.has_uncommitted {
                parts.push("uncommitted changes".to_string());
            }
        }
        Provider::ObjectStorage => {
            if status.pending_push_count > 0 {
                parts.push(format!("{} to push", status.pending_push_count));
            }
            if status.needs_pull {
                parts.push("remote changes to pull".to_string());
            }
        }
        Provider::Local => {}
    }
    parts.join(", ").yellow().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_git_status() {
        colored::control::set_override(false);
        let status = SyncStatus {
            ahead_count: 2,
            has_uncommitted: true,
            ..SyncStatus::clean(Provider::Git)
        };
        assert_eq!(describe(&status), "2 ahead, uncommitted changes");
        assert_eq!(describe(&SyncStatus::clean(Provider::Git)), "up to date");
    }

    #[test]
    fn test_describe_bucket_status() {
        colored::control::set_override(false);
        let status = SyncStatus {
            pending_push_count: 3,
            needs_pull: true,
            ..SyncStatus::clean(Provider::ObjectStorage)
        };
        assert_eq!(describe(&status), "3 to push, remote changes to pull");
    }
}
