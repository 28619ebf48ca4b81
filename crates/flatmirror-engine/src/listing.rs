//! Parsing of the origin's remote data formats.
//!
//! Directory indexes are HTML pages whose rows link to their entries with
//! self-relative anchors (`href="./NAME"`). That convention is the listing
//! contract; anchors pointing anywhere else (parent directories, absolute
//! URLs, sort toggles) are not entries.

use once_cell::sync::Lazy;
use regex::Regex;

static ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<a\s+[^>]*href="\./([^"]+)""#).unwrap());

/// Extract entry names from a directory index, in listing order.
pub fn entries(html: &str) -> Vec<String> {
    ANCHOR
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Extract the release version from a `version.txt` marker file.
pub fn version_marker(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix("FLATCAR_VERSION="))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<html><body><h1>Index of /</h1><pre>
<a href="../">../</a>
<a href="./current/">current/</a>
<a href="./2191.5.0/">2191.5.0/</a>
<a href="./flatcar_production_image.bin.bz2">flatcar_production_image.bin.bz2</a>
<a href="https://example.net/elsewhere">elsewhere</a>
</pre></body></html>"#;

    #[test]
    fn test_entries_accepts_self_relative_anchors_only() {
        let names = entries(INDEX);
        assert_eq!(
            names,
            vec![
                "current/",
                "2191.5.0/",
                "flatcar_production_image.bin.bz2",
            ]
        );
    }

    #[test]
    fn test_entries_preserve_listing_order() {
        let html = r#"<a href="./b/">b/</a><a href="./a/">a/</a>"#;
        assert_eq!(entries(html), vec!["b/", "a/"]);
    }

    #[test]
    fn test_entries_empty_listing() {
        assert!(entries("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_version_marker() {
        let text = "FLATCAR_BUILD=2191\nFLATCAR_VERSION=2191.5.0\nFLATCAR_VERSION_ID=2191.5.0\n";
        assert_eq!(version_marker(text).as_deref(), Some("2191.5.0"));
    }

    #[test]
    fn test_version_marker_missing_key() {
        assert_eq!(version_marker("VERSION=2191.5.0\n"), None);
        assert_eq!(version_marker("FLATCAR_VERSION=\n"), None);
    }
}
