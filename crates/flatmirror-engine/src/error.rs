//! Error types for flatmirror-engine.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("failed to fetch {url}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("version marker at {url} is missing FLATCAR_VERSION")]
    VersionMarker { url: String },

    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("channel task failed to complete")]
    Task(#[source] tokio::task::JoinError),

    #[error("mirror interrupted")]
    Cancelled,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] flatmirror_fetch::FetchError),

    #[error(transparent)]
    Fs(#[from] flatmirror_fs::Error),
}

impl MirrorError {
    pub(crate) fn transport(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        MirrorError::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
