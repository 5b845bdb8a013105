//! Version command implementation.

use crate::error::Result;
use crate::model::Provider;
use serde::Serialize;

const PROVIDERS: [Provider; 3] = [Provider::Git, Provider::ObjectStorage, Provider::Local];

#[derive(Serialize)]
struct VersionOutput<'a> {
    name: &'a str,
    version: &'a str,
    build: &'a str,
    providers: &'a [Provider],
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) { "dev" } else { "release" };

    if json {
        let output = VersionOutput {
            name: env!("CARGO_PKG_NAME"),
            version,
            build,
            providers: &PROVIDERS,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    let providers: Vec<String> = PROVIDERS.iter().map(ToString::to_string).collect();
    println!("ns version {version} ({build}); providers: {}", providers.join(", "));
    Ok(())
}
