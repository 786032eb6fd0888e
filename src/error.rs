use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to load plugin list from {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("{url} returned status {status}")]
    Api {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no artifact named '{label}' found for {repo}")]
    ArtifactNotFound { label: String, repo: String },

    #[error("no .{kind} payload found in {}", .dir.display())]
    MissingPayload { kind: &'static str, dir: PathBuf },

    #[error("multiple .{kind} payloads found in {}, expected exactly one", .dir.display())]
    AmbiguousPayload { kind: &'static str, dir: PathBuf },

    #[error("invalid artifact timestamp '{value}'")]
    BadTimestamp { value: String },

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
