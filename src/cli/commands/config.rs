//! Config command implementation.

use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::config::{config_path, load_config, resolve_auto_sync, save_config};
use crate::error::Result;
use crate::model::{AutoSyncConfig, Provider};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigOutput {
    path: String,
    root: Option<String>,
    provider: Option<Provider>,
    bucket: Option<String>,
    auto_sync: AutoSyncConfig,
    effective_interval_seconds: u64,
}

/// Execute config command.
pub fn execute(command: &ConfigCommands, json: bool) -> Result<()> {
    match command {
        ConfigCommands::Show => execute_show(json),
        ConfigCommands::SetAutoSync { enabled, interval } => {
            execute_set_auto_sync(*enabled, *interval, json)
        }
    }
}

fn execute_show(json: bool) -> Result<()> {
    let path = config_path()?;
    let config = load_config()?;
    let auto_sync = resolve_auto_sync(&config)?;

    let output = ConfigOutput {
        path: path.display().to_string(),
        root: config.workspace.root.map(|p| p.display().to_string()),
        provider: config.workspace.provider,
        bucket: config.workspace.bucket.map(|p| p.display().to_string()),
        auto_sync,
        effective_interval_seconds: auto_sync.effective_interval().as_secs(),
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Config:    {}", output.path);
    println!("Root:      {}", output.root.as_deref().unwrap_or("(current directory)"));
    println!(
        "Provider:  {}",
        output
            .provider
            .map_or_else(|| "(detected)".to_string(), |p| p.to_string())
    );
    if let Some(bucket) = &output.bucket {
        println!("Bucket:    {bucket}");
    }
    println!(
        "Auto-sync: {} (every {}s)",
        if auto_sync.enabled { "on" } else { "off" },
        output.effective_interval_seconds
    );
    Ok(())
}

fn execute_set_auto_sync(enabled: Option<bool>, interval: Option<u64>, json: bool) -> Result<()> {
    let mut config = load_config()?;
    if let Some(enabled) = enabled {
        config.auto_sync.enabled = enabled;
    }
    if let Some(interval) = interval {
        config.auto_sync.interval_seconds = Some(interval);
    }
    save_config(&config)?;

    let auto_sync = config.auto_sync;
    if json {
        println!("{}", serde_json::to_string(&auto_sync)?);
    } else {
        println!(
            "Auto-sync {} (every {}s)",
            if auto_sync.enabled { "enabled" } else { "disabled" },
            auto_sync.effective_interval().as_secs()
        );
    }
    Ok(())
}
