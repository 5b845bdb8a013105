//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::model::Provider;

pub mod commands;

/// notesync - keep a notes folder in step with git or a bucket
#[derive(Parser, Debug)]
#[command(name = "ns", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root (default: config, then current directory)
    #[arg(long, short = 'w', global = true, env = "NOTESYNC_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Backing store: git, s3, or local (default: detected)
    #[arg(long, global = true)]
    pub provider: Option<Provider>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// The workspace the command should operate on.
    #[must_use]
    pub fn target(&self) -> Target<'_> {
        Target {
            workspace: self.workspace.as_deref(),
            provider: self.provider,
        }
    }
}

/// Workspace selection from the global flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Target<'a> {
    pub workspace: Option<&'a std::path::Path>,
    pub provider: Option<Provider>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show provider and sync status
    Status,

    /// List documents
    Tree,

    /// Print a document
    Cat {
        /// Document path, relative to the workspace root
        path: String,
    },

    /// Write a document and save it
    Write {
        /// Document path, relative to the workspace root
        path: String,

        /// New content (read from stdin if omitted)
        #[arg(long, short = 'c')]
        content: Option<String>,
    },

    /// Commit and push (git) or sync (object storage)
    Sync,

    /// Pull remote changes
    Pull,

    /// Fetch remote state without changing documents
    Fetch,

    /// Push local changes
    Push,

    /// Rename a document
    Mv {
        /// Current path
        from: String,
        /// New path
        to: String,
    },

    /// Delete a document
    Rm {
        /// Document path
        path: String,
    },

    /// Poll the remote in the background and print changes until Ctrl-C
    Watch,

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the config file path and resolved settings
    Show,

    /// Change background reconciliation settings
    SetAutoSync {
        /// Turn auto-sync on or off
        #[arg(long)]
        enabled: Option<bool>,

        /// Seconds between polls (0 = default of 30)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["ns", "status", "--provider", "s3", "-w", "/notes", "-vv"]);
        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.provider, Some(Provider::ObjectStorage));
        assert_eq!(cli.target().workspace, Some(std::path::Path::new("/notes")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_invalid_provider_is_rejected() {
        let result = Cli::try_parse_from(["ns", "--provider", "ftp", "status"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_auto_sync_args() {
        let cli = Cli::parse_from(["ns", "config", "set-auto-sync", "--enabled", "false"]);
        match cli.command {
            Commands::Config {
                command: ConfigCommands::SetAutoSync { enabled, interval },
            } => {
                assert_eq!(enabled, Some(false));
                assert_eq!(interval, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
