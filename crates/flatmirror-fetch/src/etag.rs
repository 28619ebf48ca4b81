//! Synthesis of the origin's change-detection token from local metadata.
//!
//! The origin derives its validator from a file's modification time and byte
//! size, each base-36 encoded and concatenated. Re-deriving the same token
//! from the local copy makes conditional fetches work without any side-stored
//! cache: a file downloaded with the remote mtime applied re-encodes to
//! exactly the token the origin would emit for the unchanged resource.

use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::Result;
use flatmirror_fs::Error as FsError;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Build the quoted validator token for a (mtime, size) pair.
pub fn synthesize(mtime_secs: u64, len: u64) -> String {
    format!("\"{}{}\"", base36(mtime_secs), base36(len))
}

/// Build the validator token for an existing local file.
pub fn for_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let meta = std::fs::metadata(path).map_err(|e| FsError::Metadata {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mtime = meta
        .modified()
        .map_err(|e| FsError::Metadata {
            path: path.to_path_buf(),
            source: e,
        })?
        .duration_since(UNIX_EPOCH)
        // pre-epoch mtimes clamp to zero
        .unwrap_or_default()
        .as_secs();
    Ok(synthesize(mtime, meta.len()))
}

fn base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    // u64::MAX is 13 digits in base 36
    let mut buf = [0u8; 13];
    let mut i = buf.len();
    while n > 0 {
        i -= 1;
        buf[i] = DIGITS[(n % 36) as usize];
        n /= 36;
    }
    String::from_utf8_lossy(&buf[i..]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base36_digits() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(9), "9");
        assert_eq!(base36(10), "a");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36), "100");
        assert_eq!(base36(1_700_000_000), "s44we8");
    }

    #[test]
    fn test_synthesize_is_quoted() {
        assert_eq!(synthesize(0, 0), "\"00\"");
        assert_eq!(synthesize(36, 35), "\"10z\"");
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let a = synthesize(1_700_000_000, 4096);
        let b = synthesize(1_700_000_000, 4096);
        assert_eq!(a, b);
    }

    #[test]
    fn test_for_file_matches_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload");
        std::fs::write(&path, b"four").unwrap();

        let remote = std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        flatmirror_fs::set_mtime(&path, remote).unwrap();

        assert_eq!(for_file(&path).unwrap(), synthesize(1_700_000_000, 4));
    }

    proptest! {
        #[test]
        fn prop_base36_roundtrip(n in any::<u64>()) {
            prop_assert_eq!(u64::from_str_radix(&base36(n), 36).unwrap(), n);
        }

        #[test]
        fn prop_synthesize_stable(m in any::<u64>(), s in any::<u64>()) {
            prop_assert_eq!(synthesize(m, s), synthesize(m, s));
        }
    }
}
