//! Typed configuration consumed by the engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::filter::NameFilter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("exclude and include-only patterns are mutually exclusive")]
    ConflictingFilters,

    #[error("invalid filter pattern")]
    InvalidPattern(#[from] regex::Error),

    #[error("at least one channel must be configured")]
    NoChannels,
}

/// Everything a mirror run needs, assembled by the CLI layer.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Remote host suffix; each channel resolves to `https://<channel>.<host>/`.
    pub host: String,
    /// Channels to mirror, each into its own subdirectory of `root`.
    pub channels: Vec<String>,
    /// Local mirror root.
    pub root: PathBuf,
    /// Version directories below this floor are pruned.
    pub version_floor: Option<u64>,
    pub filter: NameFilter,
    /// Single-instance lock marker, outside the mirrored tree.
    pub lock_path: PathBuf,
    /// Failure marker left for operators after a failing run.
    pub failure_path: PathBuf,
}

impl MirrorConfig {
    pub fn channel_url(&self, channel: &str) -> String {
        format!("https://{channel}.{}/", self.host)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        Ok(())
    }
}
