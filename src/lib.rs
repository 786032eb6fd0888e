pub mod builder;
pub mod config;
pub mod error;
pub mod github;
pub mod manifest;

pub use builder::ManifestBuilder;
pub use config::PluginDef;
pub use error::{FeedError, Result};
