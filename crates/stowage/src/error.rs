//! Exit-code classification.
//!
//! Commands return `anyhow::Error`. [`ErrorKind::of`] walks the error chain
//! once at the process boundary and picks the kind; nothing below `main`
//! knows about exit codes.

use std::fmt;

use stowage_fetch::DownloadError;
use stowage_install::Error as InstallError;
use stowage_registry::Error as RegistryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Manifest,
    Integrity,
    Transport,
    Filesystem,
    /// Some units failed while the rest completed.
    Partial,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Partial => 1,
            Self::Usage => 2,
            Self::Manifest => 3,
            Self::Transport => 4,
            Self::Integrity => 5,
            Self::Filesystem => 6,
        }
    }

    pub fn of(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if let Some(failed) = cause.downcast_ref::<Failed>() {
                return failed.kind;
            }
            if let Some(error) = cause.downcast_ref::<InstallError>() {
                return Self::of_install(error);
            }
            if let Some(error) = cause.downcast_ref::<RegistryError>() {
                return match error {
                    RegistryError::NotTracked(_) => Self::Usage,
                    RegistryError::Decode { .. } | RegistryError::Manifest(_) => Self::Manifest,
                    RegistryError::Load { .. } => Self::Transport,
                    RegistryError::Install(error) => Self::of_install(error),
                    _ => Self::Filesystem,
                };
            }
            if cause.is::<stowage_manifest::Error>() {
                return Self::Manifest;
            }
            if cause.is::<DownloadError>() {
                return Self::Transport;
            }
        }
        Self::Filesystem
    }

    fn of_install(error: &InstallError) -> Self {
        match error {
            InstallError::Partial { .. } => Self::Partial,
            InstallError::Manifest(_) => Self::Manifest,
            InstallError::Download(_) => Self::Transport,
            InstallError::DigestMismatch { .. } | InstallError::ArtifactDigestMismatch { .. } => Self::Integrity,
            _ => Self::Filesystem,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Usage => "usage",
            Self::Manifest => "manifest",
            Self::Integrity => "integrity",
            Self::Transport => "transport",
            Self::Filesystem => "filesystem",
            Self::Partial => "partial",
        };
        f.write_str(name)
    }
}

/// A command-level failure that already knows its kind.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Failed {
    pub kind:    ErrorKind,
    pub message: String,
}

impl Failed {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_through_context() {
        let error = anyhow::Error::new(InstallError::Partial {
            total:    2,
            failures: Vec::new(),
        })
        .context("get failed");
        assert_eq!(ErrorKind::of(&error), ErrorKind::Partial);

        let error = anyhow::Error::new(RegistryError::NotTracked("x".into()));
        assert_eq!(ErrorKind::of(&error).exit_code(), 2);

        let error = anyhow::Error::new(Failed::new(ErrorKind::Integrity, "bad"));
        assert_eq!(ErrorKind::of(&error), ErrorKind::Integrity);

        assert_eq!(ErrorKind::of(&anyhow::anyhow!("other")), ErrorKind::Filesystem);
    }
}
