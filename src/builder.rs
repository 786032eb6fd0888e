use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use zip::ZipArchive;

use crate::config::{self, FeedConfig, PluginDef};
use crate::error::{FeedError, Result};
use crate::github::{self, ArtifactClient};
use crate::manifest::PluginManifest;

/// Orchestrates the fetch -> extract -> merge -> emit flow for every
/// configured plugin and produces the aggregate manifest.
pub struct ManifestBuilder {
    client: ArtifactClient,
    config: &'static FeedConfig,
}

impl ManifestBuilder {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: ArtifactClient::new(token)?,
            config: FeedConfig::get(),
        })
    }

    /// End-to-end run: load the plugin list, purge prior output, process
    /// every plugin in list order, write the aggregate manifest. Any
    /// failure aborts the whole batch; nothing is retried, and an aborted
    /// run leaves already-extracted directories behind without writing the
    /// aggregate file.
    pub async fn run(&self, plugins_path: &Path) -> Result<()> {
        let plugins = config::load_plugins(plugins_path)?;
        purge_dir(Path::new(&self.config.feed.output_dir))?;

        let mut manifests = Vec::with_capacity(plugins.len());
        for plugin in &plugins {
            manifests.push(self.process_plugin(plugin).await?);
        }

        self.write_manifest(&manifests, Path::new(&self.config.feed.output_file))
    }

    pub async fn process_plugin(&self, plugin: &PluginDef) -> Result<PluginManifest> {
        println!(
            " ==== {} ==== ",
            style(format!("{}/{}", plugin.user, plugin.repo)).cyan().bold()
        );

        let artifacts = self.client.list_artifacts(&plugin.user, &plugin.repo).await?;
        let artifact =
            github::select_latest(&artifacts, &self.config.feed.artifact_label, &plugin.repo)?;

        println!("Found artifact: {}", artifact.name);
        println!("ID: {}", artifact.id);
        println!("Size: {}B", artifact.size_in_bytes);
        println!("Updated at: {}", artifact.updated_at);

        let pb = create_progress_bar(&format!("Downloading artifact {}", artifact.id));
        let download = self.client.download(&plugin.user, artifact).await;
        pb.finish_and_clear();
        let bytes = download?;

        let plugin_dir = PathBuf::from(&self.config.feed.output_dir).join(&plugin.repo);
        extract_archive(&bytes, &plugin_dir)?;

        let manifest_path = locate_payload(&plugin_dir, "json")?;
        let package_path = locate_payload(&plugin_dir, "zip")?;
        println!("JSON: {}", manifest_path.display());
        println!("Zip: {}", package_path.display());

        let mut manifest = PluginManifest::from_slice(&fs::read(&manifest_path)?)?;

        // Link paths are feed-relative and always use forward slashes.
        let zip_ref = format!(
            "{}/{}/{}",
            self.config.feed.output_dir,
            plugin.repo,
            package_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        manifest.patch(&artifact.updated_at, &zip_ref, &self.config.links_base())?;

        println!();
        Ok(manifest)
    }

    /// Serialize the ordered manifest collection as pretty JSON, fully
    /// replacing any prior file.
    pub fn write_manifest(&self, manifests: &[PluginManifest], path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(manifests)?;
        fs::write(path, json)?;
        tracing::info!(
            count = manifests.len(),
            path = %path.display(),
            "Aggregate manifest written"
        );
        Ok(())
    }
}

/// Remove an output directory from a prior run. Missing is fine.
fn purge_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Purged prior output directory");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Unpack the artifact archive into `dir`, creating it if needed. An
/// existing directory is extracted into, not an error.
fn extract_archive(bytes: &[u8], dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    archive.extract(dir)?;
    tracing::debug!(path = %dir.display(), entries = archive.len(), "Artifact extracted");
    Ok(())
}

/// Find exactly one file with the given extension directly inside `dir`.
/// Zero or multiple matches violate the payload contract and abort the run.
fn locate_payload(dir: &Path, ext: &'static str) -> Result<PathBuf> {
    let mut matches = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            matches.push(path);
        }
    }
    matches.sort();

    match matches.len() {
        0 => Err(FeedError::MissingPayload {
            kind: ext,
            dir: dir.to_path_buf(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(FeedError::AmbiguousPayload {
            kind: ext,
            dir: dir.to_path_buf(),
        }),
    }
}

fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
