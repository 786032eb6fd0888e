use serde::Deserialize;

use crate::error::{FeedError, Result};

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "feedgen";

#[derive(Debug, Deserialize)]
struct ArtifactList {
    artifacts: Vec<Artifact>,
}

/// A workflow build artifact as reported by the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub id: u64,
    pub size_in_bytes: u64,
    pub updated_at: String,
    pub archive_download_url: String,
}

/// Client for the artifact listing and download API pair. Both calls
/// authenticate with basic credentials: username = repository owner,
/// password = the shared access token.
pub struct ArtifactClient {
    http: reqwest::Client,
    token: String,
}

impl ArtifactClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            token: token.into(),
        })
    }

    pub async fn list_artifacts(&self, user: &str, repo: &str) -> Result<Vec<Artifact>> {
        let url = format!("{}/repos/{}/{}/actions/artifacts", API_BASE, user, repo);
        tracing::debug!(url = %url, "Listing artifacts");

        let response = self
            .http
            .get(&url)
            .basic_auth(user, Some(&self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Api {
                url,
                status: response.status(),
            });
        }

        let list: ArtifactList = response.json().await?;
        tracing::debug!(count = list.artifacts.len(), "Artifacts listed");
        Ok(list.artifacts)
    }

    pub async fn download(&self, user: &str, artifact: &Artifact) -> Result<Vec<u8>> {
        tracing::debug!(
            url = %artifact.archive_download_url,
            id = artifact.id,
            "Downloading artifact archive"
        );

        let response = self
            .http
            .get(&artifact.archive_download_url)
            .basic_auth(user, Some(&self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Api {
                url: artifact.archive_download_url.clone(),
                status: response.status(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Pick the most recently updated artifact with the given name. Timestamps
/// compare as strings (RFC 3339 sorts chronologically); ties resolve to the
/// first entry encountered.
pub fn select_latest<'a>(
    artifacts: &'a [Artifact],
    label: &str,
    repo: &str,
) -> Result<&'a Artifact> {
    let mut best: Option<&Artifact> = None;

    for artifact in artifacts.iter().filter(|a| a.name == label) {
        match best {
            Some(current) if artifact.updated_at <= current.updated_at => {}
            _ => best = Some(artifact),
        }
    }

    best.ok_or_else(|| FeedError::ArtifactNotFound {
        label: label.to_string(),
        repo: repo.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(name: &str, id: u64, updated_at: &str) -> Artifact {
        Artifact {
            name: name.to_string(),
            id,
            size_in_bytes: 1024,
            updated_at: updated_at.to_string(),
            archive_download_url: format!("https://example.test/artifacts/{}", id),
        }
    }

    #[test]
    fn test_select_latest_picks_greatest_timestamp() {
        let artifacts = vec![
            artifact("ReleaseArtifact", 1, "2024-01-01T00:00:00Z"),
            artifact("ReleaseArtifact", 2, "2024-03-01T00:00:00Z"),
            artifact("ReleaseArtifact", 3, "2024-02-01T00:00:00Z"),
        ];

        let selected = select_latest(&artifacts, "ReleaseArtifact", "MyPlugin").unwrap();
        assert_eq!(selected.id, 2);
    }

    #[test]
    fn test_select_latest_ignores_other_names() {
        let artifacts = vec![
            artifact("DebugArtifact", 1, "2024-12-01T00:00:00Z"),
            artifact("ReleaseArtifact", 2, "2024-01-01T00:00:00Z"),
        ];

        let selected = select_latest(&artifacts, "ReleaseArtifact", "MyPlugin").unwrap();
        assert_eq!(selected.id, 2);
    }

    #[test]
    fn test_select_latest_tie_keeps_first() {
        let artifacts = vec![
            artifact("ReleaseArtifact", 1, "2024-01-01T00:00:00Z"),
            artifact("ReleaseArtifact", 2, "2024-01-01T00:00:00Z"),
        ];

        let selected = select_latest(&artifacts, "ReleaseArtifact", "MyPlugin").unwrap();
        assert_eq!(selected.id, 1);
    }

    #[test]
    fn test_select_latest_no_match() {
        let artifacts = vec![artifact("DebugArtifact", 1, "2024-01-01T00:00:00Z")];

        let err = select_latest(&artifacts, "ReleaseArtifact", "MyPlugin").unwrap_err();
        assert!(matches!(
            err,
            FeedError::ArtifactNotFound { ref label, ref repo }
                if label == "ReleaseArtifact" && repo == "MyPlugin"
        ));
    }

    #[test]
    fn test_select_latest_empty_listing() {
        let err = select_latest(&[], "ReleaseArtifact", "MyPlugin").unwrap_err();
        assert!(matches!(err, FeedError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_listing_response_shape() {
        let body = r#"{
            "total_count": 1,
            "artifacts": [{
                "name": "ReleaseArtifact",
                "id": 42,
                "size_in_bytes": 2048,
                "updated_at": "2024-05-04T12:00:00Z",
                "archive_download_url": "https://api.github.com/repos/o/r/actions/artifacts/42/zip"
            }]
        }"#;

        let list: ArtifactList = serde_json::from_str(body).unwrap();
        assert_eq!(list.artifacts.len(), 1);
        assert_eq!(list.artifacts[0].id, 42);
        assert_eq!(list.artifacts[0].size_in_bytes, 2048);
    }
}
