//! Transport seam for stowage.
//!
//! Everything that touches the network goes through [`Downloader`]. Callers
//! inject an implementation (the reqwest-backed [`HttpDownloader`] in the
//! binary, closures in tests), which keeps the rest of the workspace
//! synchronous and free of HTTP concerns.

mod downloader;
mod error;
#[cfg(feature = "reqwest")]
mod http;
mod source;

pub use downloader::Downloader;
pub use error::{DownloadError, Result};
#[cfg(feature = "reqwest")]
pub use http::HttpDownloader;
pub use source::{is_remote, load_raw_bytes};
