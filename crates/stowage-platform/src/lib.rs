//! Platform helpers: shell-style environment expansion and user directories.

pub mod dir;
pub mod env;

pub use dir::{default_stowage_home, user_data, user_home};
pub use env::{expand_env, expand_with};
