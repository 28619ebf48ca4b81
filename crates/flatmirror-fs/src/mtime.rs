use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;

use crate::error::{Error, Result};

/// Apply `mtime` to the file at `path`.
///
/// Used to stamp downloaded files with the modification time the origin
/// reported, keeping the change-detection token reproducible from local
/// metadata alone.
pub fn set_mtime(path: impl AsRef<Path>, mtime: SystemTime) -> Result<()> {
    let path = path.as_ref();
    filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).map_err(|e| {
        Error::SetMtime {
            path: path.to_path_buf(),
            source: e,
        }
    })
}
