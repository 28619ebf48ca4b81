//! Run-coordination marker files.
//!
//! Both markers are pure presence files: nothing ever reads their content
//! back, so no locking discipline beyond create/check/remove is needed.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Exclusive run lock backed by a marker file.
///
/// The marker is created with `create_new`, so acquisition races resolve in
/// the filesystem. The file is removed when the guard drops, on every exit
/// path of the owning scope.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path { &self.path }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Try to acquire the run lock at `path`.
///
/// Returns `Ok(None)` when another run already holds it.
pub fn acquire_lock(path: impl Into<PathBuf>) -> Result<Option<LockGuard>> {
    let path = path.into();
    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            let _ = write!(file, "{}", std::process::id());
            Ok(Some(LockGuard { path }))
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(Error::Create { path, source: e }),
    }
}

/// A presence marker that survives the process, e.g. the failure marker
/// inspected by operators between runs.
#[derive(Debug, Clone)]
pub struct Marker {
    path: PathBuf,
}

impl Marker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn set(&self) -> Result<()> {
        std::fs::write(&self.path, []).map_err(|e| Error::Write {
            path: self.path.clone(),
            source: e,
        })
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Remove {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    pub fn is_set(&self) -> bool { self.path.exists() }
}
