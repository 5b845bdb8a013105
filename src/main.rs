//! notesync CLI entry point.

use clap::Parser;
use ns::cli::commands;
use ns::cli::commands::remote::RemoteCommand;
use ns::cli::{Cli, Commands};
use ns::error::Error;
use ns::workspace::RemoteAction;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let target = cli.target();
    match &cli.command {
        Commands::Status => commands::status::execute(target, json),
        Commands::Tree => commands::tree::execute(target, json),

        // Documents
        Commands::Cat { path } => commands::document::execute_cat(target, path, json),
        Commands::Write { path, content } => {
            commands::document::execute_write(target, path, content.as_deref(), json)
        }
        Commands::Mv { from, to } => commands::document::execute_mv(target, from, to, json),
        Commands::Rm { path } => commands::document::execute_rm(target, path, json),

        // Remote
        Commands::Sync => commands::remote::execute(target, RemoteCommand::Sync, json),
        Commands::Pull => {
            commands::remote::execute(target, RemoteCommand::Action(RemoteAction::Pull), json)
        }
        Commands::Fetch => {
            commands::remote::execute(target, RemoteCommand::Action(RemoteAction::Fetch), json)
        }
        Commands::Push => {
            commands::remote::execute(target, RemoteCommand::Action(RemoteAction::Push), json)
        }

        // Background reconciliation
        Commands::Watch => commands::watch::execute(target, json),

        Commands::Config { command } => commands::config::execute(command, json),
        Commands::Completions { shell } => commands::completions::execute(*shell),
        Commands::Version => commands::version::execute(json),
    }
}
