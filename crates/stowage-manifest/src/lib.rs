//! Manifest model, parsing and output path resolution.
//!
//! A manifest is a YAML sequence of repositories, each a base URL plus the
//! files to fetch from it:
//!
//! ```yaml
//! - comment: release tools
//!   url: https://example.com/releases
//!   files:
//!     - file_name: tool.tar.gz
//!       digest: 5f1c...
//!       encoding: tar+gzip
//!       extract: tool-1.0/bin/tool
//!       mode: "0755"
//!       out_dir: $HOME/.local/bin
//! ```

mod data;
mod error;
mod load;
pub mod resolve;

pub use data::{FileEntry, Manifest, Repository, SymlinkSpec, Target};
pub use error::{Error, Result};
pub use load::{parse_manifest, parse_manifest_bytes};
pub use resolve::{check_entry, clean_path, file_url, is_full_tree, output_dir, planned_path, resolve_path, targets};
