use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FeedError, Result};

/// A single plugin's manifest document. Upstream authors control the shape,
/// so it stays a free-form key/value map; the distribution only ever
/// overwrites a fixed set of keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginManifest {
    fields: Map<String, Value>,
}

impl PluginManifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let fields: Map<String, Value> = serde_json::from_slice(bytes)?;
        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Overwrite the distribution-controlled fields. Whatever the upstream
    /// artifact shipped for these keys is discarded: the feed decides
    /// visibility, testing exclusivity, freshness, and where installers
    /// download from.
    pub fn patch(&mut self, updated_at: &str, zip_path: &str, links_base: &str) -> Result<()> {
        let timestamp = parse_epoch(updated_at)?;
        let link = format!("{}/{}", links_base, zip_path);

        self.fields.insert("IsHide".into(), Value::Bool(false));
        self.fields
            .insert("IsTestingExclusive".into(), Value::Bool(false));
        self.fields.insert("LastUpdated".into(), timestamp.into());
        self.fields
            .insert("DownloadLinkInstall".into(), Value::String(link.clone()));
        self.fields
            .insert("DownloadLinkTesting".into(), Value::String(link.clone()));
        self.fields
            .insert("DownloadLinkUpdate".into(), Value::String(link));

        Ok(())
    }
}

/// RFC 3339 artifact timestamp to epoch seconds.
fn parse_epoch(value: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .map_err(|_| FeedError::BadTimestamp {
            value: value.to_string(),
        })
}
