use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to move '{from}' to '{to}': {source}")]
    Move {
        from:   PathBuf,
        to:     PathBuf,
        source: io::Error,
    },

    #[error("refusing to replace directory '{path}'")]
    IsDirectory { path: PathBuf },

    #[error("invalid file mode {mode:?}: expected an octal string such as \"0755\"")]
    InvalidMode { mode: String },
}

pub type Result<T> = std::result::Result<T, Error>;
