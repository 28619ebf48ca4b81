//! Recursive traversal of one remote directory tree.
//!
//! A walk is a pure function of an explicit `(remote URL, local path)` pair;
//! there is no process-level current-directory state. Entries are processed
//! strictly sequentially in listing order, and a subdirectory is fully
//! drained before the next sibling, so within a channel all filesystem
//! mutations happen depth-first in listing order. Any failure is fatal to
//! the enclosing subtree and propagates up the recursion.

use std::path::Path;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use flatmirror_fetch::{Downloader, FetchOutcome, HttpClient};

use crate::error::{MirrorError, Result};
use crate::event::{MirrorEvent, Reporter};
use crate::filter::NameFilter;
use crate::{gate, listing};

/// The "latest release" alias entry, resolved to a symlink instead of being
/// mirrored as a real directory.
const CURRENT_ALIAS: &str = "current/";
const VERSION_MARKER: &str = "version.txt";

pub struct Walker<C: HttpClient> {
    client: Arc<C>,
    downloader: Downloader<C>,
    filter: NameFilter,
    floor: Option<u64>,
    reporter: Arc<dyn Reporter>,
    cancel: CancellationToken,
}

impl<C: HttpClient> Walker<C> {
    pub fn new(
        client: Arc<C>,
        filter: NameFilter,
        floor: Option<u64>,
        reporter: Arc<dyn Reporter>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            downloader: Downloader::new(client.clone()),
            client,
            filter,
            floor,
            reporter,
            cancel,
        }
    }

    /// Mirror the remote directory at `dir_url` into `local_dir`.
    ///
    /// `dir_url` must end with `/`; `local_dir` must already exist.
    pub async fn walk(&self, dir_url: &str, local_dir: &Path) -> Result<()> {
        self.walk_dir(dir_url, local_dir).await
    }

    fn walk_dir<'a>(&'a self, dir_url: &'a str, local_dir: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let index = self
                .client
                .get_text(dir_url)
                .await
                .map_err(|e| MirrorError::transport(dir_url, e))?;

            for name in listing::entries(&index) {
                if self.cancel.is_cancelled() {
                    return Err(MirrorError::Cancelled);
                }

                if self.filter.excludes(&name) {
                    debug!("excluded {name} under {dir_url}");
                    self.reporter.event(MirrorEvent::Excluded { name: &name });
                    continue;
                }

                if name == CURRENT_ALIAS {
                    self.refresh_current_link(dir_url, local_dir).await?;
                    continue;
                }

                if let Some(dir_name) = name.strip_suffix('/') {
                    if gate::skips(dir_name, self.floor) {
                        info!("skipped {dir_name} by version");
                        self.reporter
                            .event(MirrorEvent::SkippedVersion { name: dir_name });
                        continue;
                    }
                    let child_url = format!("{dir_url}{name}");
                    let child_dir = local_dir.join(dir_name);
                    if !child_dir.exists() {
                        tokio::fs::create_dir_all(&child_dir).await.map_err(|e| {
                            MirrorError::CreateDir {
                                path: child_dir.clone(),
                                source: e,
                            }
                        })?;
                    }
                    self.walk_dir(&child_url, &child_dir).await?;
                    continue;
                }

                // Anything else is treated as a plain file, malformed rows
                // included; a row that cannot be fetched surfaces as an
                // ordinary download failure.
                let url = format!("{dir_url}{name}");
                let dest = local_dir.join(&name);
                let outcome = self
                    .downloader
                    .fetch(&url, &dest, self.filter.include_pattern())
                    .await?;
                self.reporter.event(match outcome {
                    FetchOutcome::Downloaded => MirrorEvent::Downloaded { path: &dest },
                    FetchOutcome::Updated => MirrorEvent::Updated { path: &dest },
                    FetchOutcome::Unchanged => MirrorEvent::Unchanged { path: &dest },
                    FetchOutcome::Filtered => MirrorEvent::Filtered { path: &dest },
                });
            }

            Ok(())
        })
    }

    /// Resolve the `current/` alias: read the remote version marker and
    /// repoint the local `current` symlink at the named version directory.
    async fn refresh_current_link(&self, dir_url: &str, local_dir: &Path) -> Result<()> {
        let url = format!("{dir_url}{CURRENT_ALIAS}{VERSION_MARKER}");
        let text = self
            .client
            .get_text(&url)
            .await
            .map_err(|e| MirrorError::transport(url.clone(), e))?;
        let version = listing::version_marker(&text).ok_or(MirrorError::VersionMarker { url })?;

        let link = local_dir.join("current");
        flatmirror_fs::replace_symlink(&version, &link)?;
        info!("current -> {version}");
        self.reporter.event(MirrorEvent::LinkUpdated {
            path: &link,
            target: &version,
        });
        Ok(())
    }
}
