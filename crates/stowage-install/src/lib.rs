//! Placement of manifest files on disk.
//!
//! - [`download_files`] runs the download pipeline over a manifest.
//! - [`backup_output_if_exists`] and [`backup_if_digest_mismatch`] are the
//!   two `.bak` policies guarding existing outputs.
//! - [`extract_targets`], [`cleanup_old_targets`] and [`files_need_refresh`]
//!   reconcile resolved targets with what is on disk.

mod backup;
pub mod diagnostics;
mod error;
mod pipeline;
mod targets;

pub use backup::{backup_if_digest_mismatch, backup_output_if_exists};
pub use error::{Error, Failure, Result};
pub use pipeline::{DownloadOptions, download_files, download_files_to};
pub use stowage_manifest::Target;
pub use targets::{cleanup_old_targets, extract_targets, files_need_refresh, target_drifted};
