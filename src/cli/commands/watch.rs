//! Watch command implementation.
//!
//! Keeps a session open with background reconciliation running and prints
//! every status, sync, and tree change until Ctrl-C.

use colored::Colorize;
use serde_json::json;
use tracing::info;

use super::status::describe;
use super::{block_on, open_session};
use crate::cli::Target;
use crate::error::{Error, Result};
use crate::model::{Phase, TransientStatus, TreeEntry};
use crate::workspace::CLOSE_FLUSH_DEADLINE;

/// Execute watch command.
pub fn execute(target: Target<'_>, json: bool) -> Result<()> {
    block_on(run(target, json))?
}

async fn run(target: Target<'_>, json: bool) -> Result<()> {
    let session = open_session(target, true).await?;
    let provider = session.provider();
    let auto_sync = session.auto_sync().await;

    if !provider.polls_remote() {
        return Err(Error::InvalidArgument(format!(
            "watch polls object storage only; this workspace uses {provider}"
        )));
    }
    if !auto_sync.enabled {
        return Err(Error::InvalidArgument(
            "auto-sync is disabled; run `ns config set-auto-sync --enabled true`".to_string(),
        ));
    }

    let interval = auto_sync.effective_interval();
    info!(interval_secs = interval.as_secs(), "Watching");
    if !json {
        println!(
            "Watching {} (every {}s, Ctrl-C to stop)",
            provider,
            interval.as_secs()
        );
    }

    let mut transient = session.subscribe();
    let mut sync = session.state().subscribe_sync_status();
    let mut tree = session.state().subscribe_tree();
    sync.mark_unchanged();
    tree.mark_unchanged();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Ok(()) = transient.changed() => {
                let status = transient.borrow_and_update().clone();
                print_transient(&status, json);
            }
            Ok(()) = sync.changed() => {
                if let Some(status) = sync.borrow_and_update().clone() {
                    if json {
                        println!("{}", json!({ "event": "sync", "sync": status }));
                    } else {
                        println!("sync: {}", describe(&status));
                    }
                }
            }
            Ok(()) = tree.changed() => {
                let documents: usize = tree
                    .borrow_and_update()
                    .iter()
                    .map(TreeEntry::document_count)
                    .sum();
                if json {
                    println!("{}", json!({ "event": "tree", "documents": documents }));
                } else {
                    println!("tree: {documents} documents");
                }
            }
        }
    }

    session.close(CLOSE_FLUSH_DEADLINE).await;
    if !json {
        println!("Stopped.");
    }
    Ok(())
}

fn print_transient(status: &TransientStatus, json: bool) {
    if json {
        println!("{}", json!({ "event": "status", "status": status }));
        return;
    }
    let line = match status.phase {
        Phase::Idle if status.message.is_empty() => return,
        Phase::Error => status.message.red().to_string(),
        Phase::Saved => status.message.green().to_string(),
        Phase::Idle | Phase::Saving => status.message.clone(),
    };
    println!("{line}");
}
