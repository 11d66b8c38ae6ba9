use std::path::PathBuf;

/// Kind of an extracted archive entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink { target: PathBuf },
    HardLink { target: PathBuf },
}

/// An entry written to the staging directory, relative to its root.
#[derive(Clone, Debug)]
pub struct Entry {
    pub path: PathBuf,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: EntryKind,
}
