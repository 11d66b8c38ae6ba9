use std::io;
use std::path::PathBuf;

use crate::format::Encoding;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported encoding {encoding:?}")]
    UnsupportedEncoding { encoding: String },

    #[error("encoding '{encoding}' requires an output path")]
    MissingOutputPath { encoding: Encoding },

    #[error("encoding '{encoding}' requires an output directory")]
    MissingOutputDir { encoding: Encoding },

    #[error("zip-slip attack detected: entry '{entry}' escapes the extraction root")]
    ZipSlip { entry: PathBuf },

    #[error("symlink target is absolute path: '{target}' in '{symlink}'")]
    AbsoluteSymlinkTarget { target: PathBuf, symlink: PathBuf },

    #[error("symlink target escapes extraction root: '{symlink}' -> '{target}'")]
    SymlinkEscape { target: PathBuf, symlink: PathBuf },

    #[error("archive entry has no link target: '{path}'")]
    MissingLinkTarget { path: PathBuf },

    #[error("archive entry path is not valid")]
    InvalidPath,

    #[error("unsupported archive entry type {kind} at '{path}'")]
    UnsupportedEntry { path: PathBuf, kind: String },

    #[error("'{extract}' was not found in the archive")]
    ExtractTargetMissing { extract: String },

    #[error("archive is corrupted: {source}")]
    Corrupted { source: io::Error },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to decode '{path}': {source}")]
    Decode { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Fs(#[from] stowage_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
