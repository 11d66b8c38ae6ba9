use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read registry '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("registry '{path}' is not valid JSON: {source}")]
    Decode {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode registry: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to load {source_location}: {error}")]
    Load {
        source_location: String,
        #[source]
        error:           stowage_fetch::DownloadError,
    },

    #[error("no tracked manifest matches {0:?}")]
    NotTracked(String),

    #[error(transparent)]
    Manifest(#[from] stowage_manifest::Error),

    #[error(transparent)]
    Install(#[from] stowage_install::Error),

    #[error(transparent)]
    Fs(#[from] stowage_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
