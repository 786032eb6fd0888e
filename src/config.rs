use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::{FeedError, Result};

static FEED_CONFIG: OnceLock<FeedConfig> = OnceLock::new();

const CONFIG_TOML: &str = include_str!("../config.toml");

/// A plugin repository coordinate from plugins.json.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginDef {
    pub user: String,
    pub repo: String,
    /// Carried as feed metadata; the pipeline itself does not branch on it.
    pub branch: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedConfig {
    pub feed: Feed,
}

#[derive(Debug, Deserialize)]
pub struct Feed {
    /// Repository hosting the generated feed, e.g. "feedgen/plugin-feed".
    pub repository: String,
    /// Branch raw-content links point at.
    pub branch: String,
    /// Workflow artifact name the listing is filtered on.
    pub artifact_label: String,
    /// Aggregate manifest file name.
    pub output_file: String,
    /// Directory extracted plugin payloads land in.
    pub output_dir: String,
}

impl FeedConfig {
    pub fn get() -> &'static FeedConfig {
        FEED_CONFIG
            .get_or_init(|| toml::from_str(CONFIG_TOML).expect("Failed to parse config.toml"))
    }

    /// Base URL raw-content download links are built from.
    pub fn links_base(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}",
            self.feed.repository, self.feed.branch
        )
    }
}

/// Load the plugin coordinate list. A missing or malformed file aborts the
/// run before any plugin is processed.
pub fn load_plugins(path: &Path) -> Result<Vec<PluginDef>> {
    tracing::trace!(path = %path.display(), "Loading plugin list");

    let content = fs::read_to_string(path).map_err(|e| FeedError::Config {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let plugins: Vec<PluginDef> =
        serde_json::from_str(&content).map_err(|e| FeedError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    tracing::debug!(count = plugins.len(), "Plugin list loaded");
    Ok(plugins)
}
