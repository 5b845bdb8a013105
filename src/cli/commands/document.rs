//! Document commands: cat, write, mv, rm.

use std::io::Read;

use serde::Serialize;
use tracing::debug;

use super::{block_on, check, open_session, require_document, validate_path};
use crate::cli::Target;
use crate::error::{Error, Result};
use crate::model::{Phase, TreeEntry};
use crate::workspace::CLOSE_FLUSH_DEADLINE;

#[derive(Serialize)]
struct WriteOutput<'a> {
    path: &'a str,
    bytes: usize,
    created: bool,
}

#[derive(Serialize)]
struct RenameOutput<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

#[derive(Serialize)]
struct DeleteOutput<'a> {
    path: &'a str,
    deleted: bool,
}

/// Print a document's stored content.
pub fn execute_cat(target: Target<'_>, path: &str, json: bool) -> Result<()> {
    block_on(cat(target, path, json))?
}

async fn cat(target: Target<'_>, path: &str, json: bool) -> Result<()> {
    let session = open_session(target, false).await?;
    require_document(&session, path)?;
    let document = session.open(path).await?;

    if json {
        println!("{}", serde_json::to_string(&document)?);
    } else {
        print!("{}", document.content);
        if !document.content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

/// Write `content` (or stdin) to `path` and save it.
pub fn execute_write(target: Target<'_>, path: &str, content: Option<&str>, json: bool) -> Result<()> {
    validate_path(path)?;
    let content = match content {
        Some(content) => content.to_string(),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    block_on(write(target, path, &content, json))?
}

async fn write(target: Target<'_>, path: &str, content: &str, json: bool) -> Result<()> {
    let session = open_session(target, false).await?;
    let tree = session.tree();
    let created = match TreeEntry::find(&tree, path) {
        Some(entry) if entry.is_dir => {
            return Err(Error::InvalidPath(format!("{path} is a directory")));
        }
        Some(_) => {
            session.open(path).await?;
            false
        }
        None => {
            session.create(path).await?;
            true
        }
    };

    session.edit(content).await;
    check(session.save().await)?;
    session.close(CLOSE_FLUSH_DEADLINE).await;
    debug!(path, created, "Document written");

    if json {
        let output = WriteOutput {
            path,
            bytes: content.len(),
            created,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        let verb = if created { "Created" } else { "Saved" };
        println!("{verb} {path} ({} bytes)", content.len());
    }
    Ok(())
}

/// Rename a document.
pub fn execute_mv(target: Target<'_>, from: &str, to: &str, json: bool) -> Result<()> {
    validate_path(to)?;
    block_on(mv(target, from, to, json))?
}

async fn mv(target: Target<'_>, from: &str, to: &str, json: bool) -> Result<()> {
    let session = open_session(target, false).await?;
    require_document(&session, from)?;
    if TreeEntry::find(&session.tree(), to).is_some() {
        return Err(Error::InvalidArgument(format!("{to} already exists")));
    }

    check(session.rename_document(from, to).await)?;

    // The rename stands even if the follow-up commit failed.
    let status = session.transient_status();
    let warning = (status.phase == Phase::Error).then_some(status.message);

    if json {
        let output = RenameOutput { from, to, warning };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Renamed {from} -> {to}");
        if let Some(warning) = warning {
            eprintln!("Warning: {warning}");
        }
    }
    Ok(())
}

/// Delete a document.
pub fn execute_rm(target: Target<'_>, path: &str, json: bool) -> Result<()> {
    block_on(rm(target, path, json))?
}

async fn rm(target: Target<'_>, path: &str, json: bool) -> Result<()> {
    let session = open_session(target, false).await?;
    require_document(&session, path)?;
    check(session.delete_document(path).await)?;

    if json {
        let output = DeleteOutput { path, deleted: true };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Deleted {path}");
    }
    Ok(())
}
