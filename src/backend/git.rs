//! Git-backed workspace.
//!
//! Documents live in a git working copy. Remote operations shell out to the
//! `git` executable, the same way the rest of the tool discovers repository
//! state, so credentials and hooks behave exactly as on the command line.

use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use super::{DocumentStore, WorkspaceBackend, blocking};
use crate::error::{ApiError, ApiResult};
use crate::model::{CommitOutcome, Provider, SyncStatus, TreeEntry};

/// Backend for a git working copy.
#[derive(Debug, Clone)]
pub struct GitBackend {
    store: DocumentStore,
}

impl GitBackend {
    pub fn new(root: &Path) -> Self {
        Self {
            store: DocumentStore::new(root),
        }
    }

    /// Run git in the workspace root and return stdout.
    async fn git(&self, args: &[&str]) -> ApiResult<String> {
        debug!(?args, "git");
        let output = Command::new("git")
            .arg("-C")
            .arg(self.store.root())
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ApiError::new(format!("Failed to run git: {e}")))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(ApiError::new(git_failure_message(
                &output.stderr,
                &output.stdout,
                output.status.code(),
            )))
        }
    }

    async fn has_changes(&self) -> ApiResult<bool> {
        let porcelain = self.git(&["status", "--porcelain"]).await?;
        Ok(!porcelain.trim().is_empty())
    }
}

impl WorkspaceBackend for GitBackend {
    fn provider(&self) -> Provider {
        Provider::Git
    }

    async fn save(&self, path: &str, content: &str) -> ApiResult<()> {
        let store = self.store.clone();
        let (path, content) = (path.to_string(), content.to_string());
        blocking(move || store.write(&path, &content)).await
    }

    async fn read(&self, path: &str) -> ApiResult<String> {
        let store = self.store.clone();
        let path = path.to_string();
        blocking(move || store.read(&path)).await
    }

    async fn status(&self) -> ApiResult<SyncStatus> {
        let porcelain = self.git(&["status", "--porcelain=v2", "--branch"]).await?;
        Ok(parse_porcelain_v2(&porcelain))
    }

    async fn list_tree(&self) -> ApiResult<Vec<TreeEntry>> {
        let store = self.store.clone();
        blocking(move || store.list_tree()).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let store = self.store.clone();
        let path = path.to_string();
        blocking(move || store.delete(&path)).await
    }

    async fn rename(&self, from: &str, to: &str) -> ApiResult<()> {
        let store = self.store.clone();
        let (from, to) = (from.to_string(), to.to_string());
        blocking(move || store.rename(&from, &to)).await
    }

    async fn commit_all(&self, message: &str) -> ApiResult<CommitOutcome> {
        self.git(&["add", "--all"]).await?;
        if !self.has_changes().await? {
            return Ok(CommitOutcome::NothingToCommit);
        }
        self.git(&["commit", "--quiet", "-m", message]).await?;
        Ok(CommitOutcome::Committed {
            message: message.to_string(),
        })
    }

    async fn commit_and_push_all(&self) -> ApiResult<CommitOutcome> {
        let message = default_commit_message();
        match self.commit_all(&message).await? {
            committed @ CommitOutcome::Committed { .. } => {
                self.push().await?;
                Ok(committed)
            }
            CommitOutcome::NothingToCommit => {
                // Earlier commits may still be waiting on the remote.
                let status = self.status().await?;
                if status.ahead_count == 0 {
                    return Ok(CommitOutcome::NothingToCommit);
                }
                self.push().await?;
                Ok(CommitOutcome::Committed {
                    message: format!("Pushed {} pending commit(s)", status.ahead_count),
                })
            }
        }
    }

    async fn push(&self) -> ApiResult<()> {
        self.git(&["push", "--quiet"]).await.map(drop)
    }

    async fn pull(&self) -> ApiResult<()> {
        self.git(&["pull", "--ff-only", "--quiet"]).await.map(drop)
    }

    async fn fetch(&self) -> ApiResult<()> {
        self.git(&["fetch", "--prune", "--quiet"]).await.map(drop)
    }

    async fn start_auto_push(&self) -> ApiResult<()> {
        Ok(())
    }
}

/// Commit message used by commit-and-push.
fn default_commit_message() -> String {
    format!(
        "Update notes {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    )
}

/// Parse `git status --porcelain=v2 --branch` output.
///
/// `# branch.ab +A -B` carries ahead/behind; any non-header line is a change.
fn parse_porcelain_v2(output: &str) -> SyncStatus {
    let mut status = SyncStatus::clean(Provider::Git);

    for line in output.lines() {
        if let Some(ab) = line.strip_prefix("# branch.ab ") {
            for part in ab.split_whitespace() {
                if let Some(n) = part.strip_prefix('+') {
                    status.ahead_count = n.parse().unwrap_or(0);
                } else if let Some(n) = part.strip_prefix('-') {
                    status.behind_count = n.parse().unwrap_or(0);
                }
            }
        } else if !line.starts_with('#') && !line.trim().is_empty() {
            status.has_uncommitted = true;
        }
    }

    status.pending_push_count = status.ahead_count;
    status.needs_pull = status.behind_count > 0;
    status
}

fn git_failure_message(stderr: &[u8], stdout: &[u8], code: Option<i32>) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stdout = String::from_utf8_lossy(stdout);
    let text = if stderr.trim().is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.trim().to_string()
    };

    if text.is_empty() {
        match code {
            Some(code) => format!("git exited with status {code}"),
            None => "git was terminated".to_string(),
        }
    } else {
        text.lines()
            .map(|l| {
                l.trim_start_matches("fatal: ")
                    .trim_start_matches("error: ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn init_repo(dir: &Path) {
        for args in [
            vec!["init", "--quiet"],
            vec!["config", "user.email", "notes@example.com"],
            vec!["config", "user.name", "Notes"],
            vec!["config", "commit.gpgsign", "false"],
        ] {
            let status = std::process::Command::new("git")
                .arg("-C")
                .arg(dir)
                .args(&args)
                .status()
                .unwrap();
            assert!(status.success());
        }
    }

    #[test]
    fn test_parse_clean_tracking_branch() {
        let out = "# branch.oid abc\n# branch.head main\n# branch.upstream origin/main\n# branch.ab +0 -0\n";
        let status = parse_porcelain_v2(out);
        assert_eq!(status, SyncStatus::clean(Provider::Git));
    }

    #[test]
    fn test_parse_ahead_behind_and_changes() {
        let out = "# branch.head main\n# branch.ab +2 -3\n1 .M N... 100644 100644 100644 a b note.md\n? new.md\n";
        let status = parse_porcelain_v2(out);
        assert_eq!(status.ahead_count, 2);
        assert_eq!(status.behind_count, 3);
        assert_eq!(status.pending_push_count, 2);
        assert!(status.has_uncommitted);
        assert!(status.needs_pull);
    }

    #[test]
    fn test_parse_no_upstream() {
        let out = "# branch.oid (initial)\n# branch.head main\n? todo.md\n";
        let status = parse_porcelain_v2(out);
        assert_eq!(status.ahead_count, 0);
        assert!(status.has_uncommitted);
        assert!(!status.needs_pull);
    }

    #[test]
    fn test_git_failure_message() {
        assert_eq!(
            git_failure_message(b"fatal: No configured push destination.\n", b"", Some(128)),
            "No configured push destination."
        );
        assert_eq!(git_failure_message(b"", b"", Some(1)), "git exited with status 1");
    }

    #[tokio::test]
    async fn test_commit_all_then_nothing_to_commit() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        let backend = GitBackend::new(temp.path());

        backend.save("note.md", "first").await.unwrap();
        assert!(backend.status().await.unwrap().has_uncommitted);

        let outcome = backend.commit_all("Add note").await.unwrap();
        assert_eq!(
            outcome,
            CommitOutcome::Committed {
                message: "Add note".into()
            }
        );
        assert!(!backend.status().await.unwrap().has_uncommitted);

        let again = backend.commit_all("Nothing new").await.unwrap();
        assert_eq!(again, CommitOutcome::NothingToCommit);
    }

    #[tokio::test]
    async fn test_push_without_remote_fails_with_message() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        let backend = GitBackend::new(temp.path());
        backend.save("note.md", "x").await.unwrap();
        backend.commit_all("Add note").await.unwrap();

        let err = backend.push().await.unwrap_err();
        assert!(!err.message_or("").is_empty());
    }
}
