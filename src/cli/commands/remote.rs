//! Remote commands: sync, pull, fetch, push.

use colored::Colorize;
use serde::Serialize;

use super::status::describe;
use super::{block_on, check, open_session};
use crate::cli::Target;
use crate::error::{Error, Result};
use crate::model::{Phase, SyncStatus, TransientStatus};
use crate::workspace::RemoteAction;

/// Which remote operation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Sync,
    Action(RemoteAction),
}

impl RemoteCommand {
    const fn name(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Action(RemoteAction::Pull) => "pull",
            Self::Action(RemoteAction::Fetch) => "fetch",
            Self::Action(RemoteAction::Push) => "push",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoteOutput<'a> {
    action: &'a str,
    result: TransientStatus,
    sync: Option<SyncStatus>,
}

/// Execute a remote command.
pub fn execute(target: Target<'_>, command: RemoteCommand, json: bool) -> Result<()> {
    block_on(run(target, command, json))?
}

async fn run(target: Target<'_>, command: RemoteCommand, json: bool) -> Result<()> {
    let session = open_session(target, false).await?;
    let provider = session.provider();
    if !provider.has_remote() {
        return Err(Error::NoRemote {
            provider: provider.to_string(),
        });
    }

    let outcome = match command {
        RemoteCommand::Sync => session.commit_and_push().await,
        RemoteCommand::Action(RemoteAction::Pull) => session.pull().await,
        RemoteCommand::Action(RemoteAction::Fetch) => session.fetch().await,
        RemoteCommand::Action(RemoteAction::Push) => session.push().await,
    };
    check(outcome)?;

    let result = session.transient_status();
    let sync = session.sync_status();

    if json {
        let output = RemoteOutput {
            action: command.name(),
            result,
            sync,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    let message = match result.phase {
        Phase::Saved => result.message.green().to_string(),
        Phase::Idle | Phase::Saving | Phase::Error => result.message,
    };
    println!("{message}");
    if let Some(status) = &sync {
        println!("Sync: {}", describe(status));
    }
    Ok(())
}
