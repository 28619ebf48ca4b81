//! Filesystem primitives for the flatmirror workspace: atomic symlink
//! replacement, remote-mtime application, and the run-coordination marker
//! files (run lock, failure marker).

mod error;
mod marker;
mod mtime;
mod symlink;

pub use error::{Error, Result};
pub use marker::{LockGuard, Marker, acquire_lock};
pub use mtime::set_mtime;
pub use symlink::replace_symlink;
