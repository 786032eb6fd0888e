mod args;

use std::path::Path;

use anyhow::{bail, Result};
use args::Cli;
use clap::Parser;
use feedgen::ManifestBuilder;
use tracing_subscriber::EnvFilter;

const PLUGINS_FILE: &str = "plugins.json";
const TOKEN_VAR: &str = "REPO_ACCESS_TOKEN";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let _cli = Cli::parse();

    let Ok(token) = std::env::var(TOKEN_VAR) else {
        bail!("{} is not set", TOKEN_VAR);
    };

    let builder = ManifestBuilder::new(token)?;
    builder.run(Path::new(PLUGINS_FILE)).await?;

    Ok(())
}
