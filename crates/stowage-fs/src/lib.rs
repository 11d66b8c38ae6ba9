//! Filesystem primitives used to place verified artifacts.
//!
//! - [`move_path`] renames and falls back to a mode-preserving copy when the
//!   rename crosses a filesystem boundary.
//! - [`atomic_write`] replaces a file through a sibling temp file.
//! - [`Workspace`] stages a tree privately and merges it into place on commit.

mod error;
mod permissions;
mod primitives;
mod workspace;

pub use error::{Error, Result};
pub use permissions::{parse_mode, set_mode};
pub use primitives::{
    AtomicWriteOptions, MoveKind, atomic_write, copy_all, merge_into, move_path, remove_path,
    replace_symlink,
};
pub use workspace::Workspace;
