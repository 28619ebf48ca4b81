//! Error types for flatmirror-fetch.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure for {url}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to stage download at {path}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Fs(#[from] flatmirror_fs::Error),
}

impl FetchError {
    pub(crate) fn transport(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FetchError::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T, E = FetchError> = std::result::Result<T, E>;
