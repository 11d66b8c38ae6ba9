use stowage_fetch::DownloadError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse manifest: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to load manifest from {location}: {source}")]
    Load {
        location: String,
        #[source]
        source:   DownloadError,
    },

    #[error("file entry under {base_url:?} has an empty file_name")]
    MissingFileName { base_url: String },

    #[error(transparent)]
    Encoding(#[from] stowage_archive::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
