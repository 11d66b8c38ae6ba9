//! Artifact decoding with path sanitization and staged extraction.
//!
//! # Architecture
//!
//! - `format.rs` - Encoding tags and tar codecs
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `extract.rs` - Tar entry handling into a staging root
//! - `decode.rs` - Dispatch from encoding to passthrough, zstd or archive
//!
//! Archives are always unpacked into a private staging directory first; the
//! destination only changes once the whole archive has been read.

pub use decode::{DecodeOptions, decode_artifact};
pub use entry::{Entry, EntryKind};
pub use error::{Error, Result};
pub use extract::unpack_tar;
pub use format::{Encoding, TarCompress};
pub use sanitize::{sanitize_entry_path, sanitize_symlink_target, strip_root};

mod decode;
mod entry;
mod error;
mod extract;
mod format;
mod sanitize;
