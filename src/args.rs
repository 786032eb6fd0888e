use clap::Parser;

/// Execution is parameterless: behavior is controlled by plugins.json in the
/// working directory and the REPO_ACCESS_TOKEN environment variable.
#[derive(Parser)]
#[command(name = "feedgen")]
#[command(version)]
#[command(about = "Builds the plugin distribution feed manifest", long_about = None)]
pub(crate) struct Cli {}
