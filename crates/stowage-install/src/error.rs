use std::fmt;
use std::io;
use std::path::PathBuf;

use stowage_fetch::DownloadError;
use stowage_verify::VerifyError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Manifest(#[from] stowage_manifest::Error),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Archive(#[from] stowage_archive::Error),

    #[error(transparent)]
    Fs(#[from] stowage_fs::Error),

    #[error("artifact digest mismatch for {url}: expected {expected}, got {actual}")]
    ArtifactDigestMismatch {
        url:      String,
        expected: String,
        actual:   String,
    },

    #[error("digest mismatch for '{path}': expected {expected}, got {actual}")]
    DigestMismatch {
        path:     PathBuf,
        expected: String,
        actual:   String,
    },

    #[error("'{path}' is a directory and cannot be backed up")]
    BackupIsDirectory { path: PathBuf },

    #[error("no free backup name left for '{path}'")]
    BackupExhausted { path: PathBuf },

    #[error("symlink needs both link and target (link {link:?}, target {target:?})")]
    IncompleteSymlink { link: String, target: String },

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to create temporary artifact file: {0}")]
    TempFile(#[source] io::Error),

    #[error("failed to write plan output: {0}")]
    Output(#[source] io::Error),

    #[error("{} of {total} item(s) failed: {}", .failures.len(), Failure::summary(.failures))]
    Partial { total: usize, failures: Vec<Failure> },
}

/// One failed unit of work inside an otherwise completed run.
#[derive(Debug)]
pub struct Failure {
    /// URL or path naming the unit.
    pub subject: String,
    pub error:   Box<Error>,
}

impl Failure {
    pub fn new(subject: impl Into<String>, error: Error) -> Self {
        Self {
            subject: subject.into(),
            error:   Box::new(error),
        }
    }

    fn summary(failures: &[Failure]) -> String {
        failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}: {}", self.subject, self.error) }
}

impl Error {
    /// Failures of a partial run, empty for every other variant.
    pub fn failures(&self) -> &[Failure] {
        match self {
            Self::Partial { failures, .. } => failures,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
