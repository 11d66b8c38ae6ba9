use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use stowage_archive::Encoding;

/// Ordered list of repositories. Order decides processing order only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    pub repositories: Vec<Repository>,
}

impl Manifest {
    pub fn new(repositories: Vec<Repository>) -> Self { Self { repositories } }

    /// Every file entry paired with its repository, in manifest order.
    pub fn files(&self) -> impl Iterator<Item = (&Repository, &FileEntry)> {
        self.repositories
            .iter()
            .flat_map(|repo| repo.files.iter().map(move |file| (repo, file)))
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // A bare mapping is shorthand for a one-repository manifest.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Many(Vec<Repository>),
            One(Repository),
        }

        Ok(match Helper::deserialize(deserializer)? {
            Helper::Many(repositories) => Self { repositories },
            Helper::One(repository) => Self {
                repositories: vec![repository],
            },
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment:  String,
    #[serde(rename = "url", alias = "base_url")]
    pub base_url: String,
    #[serde(default)]
    pub files:    Vec<FileEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileEntry {
    pub file_name:       String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest:          Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding:        Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract:         Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename:          Option<String>,
    #[serde(
        default,
        deserialize_with = "mode_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub mode:            Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symlink:         Option<SymlinkSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir:         Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SymlinkSpec {
    pub link:   String,
    pub target: String,
}

/// Resolved output location and the digest expected there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub path:   PathBuf,
    pub digest: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl FileEntry {
    pub fn encoding(&self) -> Result<Encoding, stowage_archive::Error> {
        Encoding::from_tag(self.encoding.as_deref())
    }

    pub fn digest(&self) -> Option<&str> { non_blank(&self.digest) }

    pub fn artifact_digest(&self) -> Option<&str> { non_blank(&self.artifact_digest) }

    pub fn mode(&self) -> Option<&str> { non_blank(&self.mode) }

    pub fn rename(&self) -> Option<&str> { non_blank(&self.rename) }

    /// The single in-archive path to extract; `None` for the whole tree.
    pub fn extract(&self) -> Option<&str> { non_blank(&self.extract).filter(|e| *e != ".") }
}

/// Accept `mode: "0755"` as well as a bare integer such as `mode: 755`.
///
/// The integer's decimal digits are what the author meant, so they are kept
/// verbatim and later read as octal.
fn mode_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Mode {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Mode>::deserialize(deserializer)?.map(|mode| match mode {
        Mode::Text(text) => text,
        Mode::Number(number) => number.to_string(),
    }))
}
