//! Conditional single-file downloads.
//!
//! A file is fetched unconditionally when no local copy exists. When one
//! does, the validator synthesized from its mtime and size is presented as a
//! conditional-request token; a 304 means the copy is current and nothing is
//! touched. Downloads stream into a dot-prefixed staging file that is renamed
//! into place, and the origin-reported modification time is applied so the
//! next run re-derives the same validator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{FetchError, Result};
use crate::etag;
use crate::http::{Download, HttpClient, Probe};

/// What `fetch` did for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No local copy existed; the file was downloaded.
    Downloaded,
    /// The local copy was stale and has been replaced.
    Updated,
    /// The origin reported 304; the local copy was left untouched.
    Unchanged,
    /// The name missed the include-only pattern; no network call was made.
    Filtered,
}

pub struct Downloader<C: HttpClient> {
    client: Arc<C>,
}

impl<C: HttpClient> Downloader<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Mirror a single remote file to `dest`.
    ///
    /// With an include-only pattern configured, names that do not match are
    /// skipped before any network traffic. Transport failures on either the
    /// probe or the content fetch propagate to the caller; the enclosing
    /// traversal aborts, unrelated channels continue.
    pub async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        include: Option<&Regex>,
    ) -> Result<FetchOutcome> {
        if let Some(pattern) = include {
            let name = dest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !pattern.is_match(&name) {
                debug!("filtered {name}, include-only pattern missed");
                return Ok(FetchOutcome::Filtered);
            }
        }

        if !dest.exists() {
            debug!("downloading {url}");
            self.transfer(url, dest).await?;
            return Ok(FetchOutcome::Downloaded);
        }

        let validator = etag::for_file(dest)?;
        match self
            .client
            .probe(url, &validator)
            .await
            .map_err(|e| FetchError::transport(url, e))?
        {
            Probe::Unchanged => {
                debug!("skipping {url}, not modified");
                Ok(FetchOutcome::Unchanged)
            }
            Probe::Modified => {
                debug!("updating {url}");
                self.transfer(url, dest).await?;
                Ok(FetchOutcome::Updated)
            }
        }
    }

    async fn transfer(&self, url: &str, dest: &Path) -> Result<()> {
        let Download {
            mut body,
            last_modified,
        } = self
            .client
            .download(url)
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let staged = staging_path(dest);
        let mut cleanup = StagingCleanup::new(staged.clone());
        let mut file = tokio::fs::File::create(&staged)
            .await
            .map_err(|e| FetchError::Stage {
                path: staged.clone(),
                source: e,
            })?;

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => file.write_all(&bytes).await.map_err(|e| FetchError::Stage {
                    path: staged.clone(),
                    source: e,
                })?,
                Err(e) => return Err(FetchError::transport(url, e)),
            }
        }

        file.flush().await.map_err(|e| FetchError::Stage {
            path: staged.clone(),
            source: e,
        })?;
        drop(file);

        tokio::fs::rename(&staged, dest)
            .await
            .map_err(|e| FetchError::Stage {
                path: staged.clone(),
                source: e,
            })?;
        cleanup.disarm();

        if let Some(modified) = last_modified {
            flatmirror_fs::set_mtime(dest, modified)?;
        }
        Ok(())
    }
}

fn staging_path(dest: &Path) -> PathBuf {
    let name = dest.file_name().unwrap_or_default().to_string_lossy();
    dest.parent()
        .unwrap_or(Path::new(""))
        .join(format!(".{name}.part"))
}

/// Removes the staging file on drop unless the rename into place happened.
struct StagingCleanup {
    path: Option<PathBuf>,
}

impl StagingCleanup {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for StagingCleanup {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use bytes::Bytes;
    use futures_util::stream;

    #[derive(Debug)]
    struct MockError(String);

    impl std::fmt::Display for MockError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for MockError {}

    #[derive(Clone)]
    struct MockFile {
        body: Vec<u8>,
        mtime: SystemTime,
    }

    #[derive(Default)]
    struct MockClient {
        files: HashMap<String, MockFile>,
        broken: bool,
        broken_body: bool,
        probes: Mutex<Vec<String>>,
        downloads: Mutex<Vec<String>>,
    }

    impl MockClient {
        fn with_file(url: &str, body: &[u8], mtime_secs: u64) -> Self {
            let mut client = Self::default();
            client.files.insert(
                url.to_string(),
                MockFile {
                    body: body.to_vec(),
                    mtime: UNIX_EPOCH + Duration::from_secs(mtime_secs),
                },
            );
            client
        }

        fn probe_count(&self) -> usize {
            self.probes.lock().unwrap().len()
        }

        fn download_count(&self) -> usize {
            self.downloads.lock().unwrap().len()
        }
    }

    impl HttpClient for MockClient {
        type Error = MockError;

        async fn get_text(&self, url: &str) -> Result<String, MockError> {
            Err(MockError(format!("unexpected listing fetch: {url}")))
        }

        async fn probe(&self, url: &str, validator: &str) -> Result<Probe, MockError> {
            self.probes.lock().unwrap().push(url.to_string());
            if self.broken {
                return Err(MockError("connection reset".to_string()));
            }
            let file = self
                .files
                .get(url)
                .ok_or_else(|| MockError(format!("404: {url}")))?;
            let mtime = file.mtime.duration_since(UNIX_EPOCH).unwrap().as_secs();
            let remote = etag::synthesize(mtime, file.body.len() as u64);
            if remote == validator {
                Ok(Probe::Unchanged)
            } else {
                Ok(Probe::Modified)
            }
        }

        async fn download(&self, url: &str) -> Result<Download<MockError>, MockError> {
            self.downloads.lock().unwrap().push(url.to_string());
            if self.broken {
                return Err(MockError("connection reset".to_string()));
            }
            let file = self
                .files
                .get(url)
                .ok_or_else(|| MockError(format!("404: {url}")))?;
            let chunks = if self.broken_body {
                vec![
                    Ok(Bytes::from(file.body.clone())),
                    Err(MockError("connection reset mid-body".to_string())),
                ]
            } else {
                vec![Ok(Bytes::from(file.body.clone()))]
            };
            Ok(Download {
                body: Box::pin(stream::iter(chunks)),
                last_modified: Some(file.mtime),
            })
        }
    }

    const URL: &str = "https://stable.example.net/file.img";

    fn downloader(client: MockClient) -> (Arc<MockClient>, Downloader<MockClient>) {
        let client = Arc::new(client);
        (client.clone(), Downloader::new(client))
    }

    #[tokio::test]
    async fn test_fresh_download_adopts_remote_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.img");
        let (client, downloader) = downloader(MockClient::with_file(URL, b"payload", 1_700_000_000));

        let outcome = downloader.fetch(URL, &dest, None).await.unwrap();

        assert_eq!(outcome, FetchOutcome::Downloaded);
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
        let modified = std::fs::metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(modified, UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        // Unconditional path: no probe.
        assert_eq!(client.probe_count(), 0);
        assert_eq!(client.download_count(), 1);
    }

    #[tokio::test]
    async fn test_unmodified_file_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.img");
        let (client, downloader) = downloader(MockClient::with_file(URL, b"payload", 1_700_000_000));

        downloader.fetch(URL, &dest, None).await.unwrap();
        let outcome = downloader.fetch(URL, &dest, None).await.unwrap();

        assert_eq!(outcome, FetchOutcome::Unchanged);
        assert_eq!(client.probe_count(), 1);
        // Only the initial transfer hit the content endpoint.
        assert_eq!(client.download_count(), 1);
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_changed_remote_overwrites_local() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.img");

        let (_, downloader) = downloader(MockClient::with_file(URL, b"old", 1_700_000_000));
        downloader.fetch(URL, &dest, None).await.unwrap();

        let (client, downloader) =
            self::downloader(MockClient::with_file(URL, b"new bytes", 1_700_000_500));
        let outcome = downloader.fetch(URL, &dest, None).await.unwrap();

        assert_eq!(outcome, FetchOutcome::Updated);
        assert_eq!(client.probe_count(), 1);
        assert_eq!(std::fs::read(&dest).unwrap(), b"new bytes");
        let modified = std::fs::metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(modified, UNIX_EPOCH + Duration::from_secs(1_700_000_500));
    }

    #[tokio::test]
    async fn test_include_only_miss_makes_no_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foo_vmware.img");
        let (client, downloader) = downloader(MockClient::with_file(URL, b"payload", 1_700_000_000));
        let include = Regex::new("qemu").unwrap();

        let outcome = downloader.fetch(URL, &dest, Some(&include)).await.unwrap();

        assert_eq!(outcome, FetchOutcome::Filtered);
        assert!(!dest.exists());
        assert_eq!(client.probe_count(), 0);
        assert_eq!(client.download_count(), 0);
    }

    #[tokio::test]
    async fn test_include_only_match_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foo_qemu.img");
        let (_, downloader) = downloader(MockClient::with_file(URL, b"payload", 1_700_000_000));
        let include = Regex::new("qemu").unwrap();

        let outcome = downloader.fetch(URL, &dest, Some(&include)).await.unwrap();

        assert_eq!(outcome, FetchOutcome::Downloaded);
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_and_leaves_no_staging() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.img");
        let mut client = MockClient::with_file(URL, b"payload", 1_700_000_000);
        client.broken = true;
        let (_, downloader) = downloader(client);

        let err = downloader.fetch(URL, &dest, None).await.unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_mid_body_failure_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.img");
        let mut client = MockClient::with_file(URL, b"partial payload", 1_700_000_000);
        client.broken_body = true;
        let (_, downloader) = downloader(client);

        let err = downloader.fetch(URL, &dest, None).await.unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(!dest.exists());
        // The half-written staging file is gone too.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
