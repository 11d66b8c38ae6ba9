//! Tracked manifest registry and the `pkg up` refresh engine.
//!
//! The registry is a JSON file listing tracked manifest sources and where a
//! copy of each is cached:
//!
//! ```json
//! {
//!   "entries": [
//!     {
//!       "id": "3f9a0c1d2e4b",
//!       "source": "https://example.com/tools.yaml",
//!       "localPath": "/home/me/.local/share/stowage/manifests/3f9a0c1d-tools.yaml",
//!       "digest": "9b1e...",
//!       "updatedAt": "2026-01-02T03:04:05Z"
//!     }
//!   ]
//! }
//! ```

mod error;
mod layout;
mod manage;
mod store;
mod up;

pub use error::{Error, Result};
pub use layout::Layout;
pub use manage::{add_source, normalize_source, remove_source};
pub use store::{Registry, RegistryEntry, cache_file_name, entry_id};
pub use up::{PkgUpOutcome, PkgUpReport, PkgUpResult, run_pkg_up};
