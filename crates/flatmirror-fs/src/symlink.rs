use std::path::Path;

use crate::error::{Error, Result};

/// Create or replace a symlink at `link` pointing at `target`.
///
/// The link is staged under a dot-prefixed sibling name and renamed into
/// place, so readers never observe a missing or half-made link.
pub fn replace_symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let link = link.as_ref();

    let name = link.file_name().unwrap_or_default().to_string_lossy();
    let staged = link
        .parent()
        .unwrap_or(Path::new(""))
        .join(format!(".{name}.lnk"));
    let _ = std::fs::remove_file(&staged);

    make_symlink(target, &staged)?;

    std::fs::rename(&staged, link).map_err(|e| Error::Write {
        path: link.to_path_buf(),
        source: e,
    })
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::Symlink {
        path: link.to_path_buf(),
        source: e,
    })
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> Result<()> {
    // Relative targets resolve against the link's directory.
    let resolved = link.parent().unwrap_or(Path::new("")).join(target);
    let result = if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };
    result.map_err(|e| Error::Symlink {
        path: link.to_path_buf(),
        source: e,
    })
}
