//! Version-floor gating of release directories.

/// Parse the numeric version prefix of a directory name: the segment up to
/// the first `.`, with any trailing `/` stripped. Names without an integer
/// prefix are not version directories.
pub fn version_prefix(name: &str) -> Option<u64> {
    let name = name.strip_suffix('/').unwrap_or(name);
    let prefix = name.split('.').next().unwrap_or(name);
    prefix.parse().ok()
}

/// Whether the version gate prunes `name` under the configured floor.
pub fn skips(name: &str, floor: Option<u64>) -> bool {
    match (floor, version_prefix(name)) {
        (Some(floor), Some(version)) => version < floor,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_prefix() {
        assert_eq!(version_prefix("2191.5.0/"), Some(2191));
        assert_eq!(version_prefix("1800.0.0"), Some(1800));
        assert_eq!(version_prefix("2100"), Some(2100));
        assert_eq!(version_prefix("current/"), None);
        assert_eq!(version_prefix("amd64-usr/"), None);
    }

    #[test]
    fn test_floor_prunes_older_versions() {
        assert!(skips("1800.0.0/", Some(2000)));
        assert!(!skips("2191.5.0/", Some(2000)));
        assert!(!skips("2000.0.0/", Some(2000)));
    }

    #[test]
    fn test_no_floor_never_skips() {
        assert!(!skips("1800.0.0/", None));
    }

    #[test]
    fn test_non_version_names_pass() {
        assert!(!skips("current/", Some(2000)));
        assert!(!skips("boards/", Some(2000)));
    }
}
