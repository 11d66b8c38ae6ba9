pub mod atomic_write;
pub mod copy_dir;
pub mod move_path;
pub mod symlink;

pub use atomic_write::{AtomicWriteOptions, atomic_write};
pub use copy_dir::copy_all;
pub use move_path::{MoveKind, merge_into, move_path, remove_path};
pub use symlink::replace_symlink;
