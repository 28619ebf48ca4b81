//! Single-instance run coordination.
//!
//! The lock marker and failure marker are explicit objects owned here and
//! never ambient state. The lock is released on every exit path through its
//! RAII guard; the failure marker is deliberately left in place after a
//! failing run so operators can see it between runs, and cleared only at the
//! start of the next one.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use flatmirror_fetch::HttpClient;
use flatmirror_fs::{Marker, acquire_lock};

use crate::channel::mirror_channels;
use crate::config::MirrorConfig;
use crate::error::Result;
use crate::event::Reporter;

/// Aggregate result of a coordinated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every channel traversal succeeded.
    Completed,
    /// Another run holds the lock; nothing was touched.
    AlreadyRunning,
    /// At least one channel failed; the others' work is persisted.
    Failed,
}

pub struct RunCoordinator {
    config: MirrorConfig,
    reporter: Arc<dyn Reporter>,
}

impl RunCoordinator {
    pub fn new(config: MirrorConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    /// Run the mirror, stopping early on ctrl-c.
    pub async fn run<C: HttpClient + 'static>(&self, client: Arc<C>) -> Result<RunOutcome> {
        self.run_until(client, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Run the mirror until the channels drain or `shutdown` resolves.
    ///
    /// On shutdown the cancellation token is forwarded to every in-flight
    /// walk; the channels are still awaited so no orphaned work continues
    /// past this call, and the lock is released either way.
    pub async fn run_until<C, F>(&self, client: Arc<C>, shutdown: F) -> Result<RunOutcome>
    where
        C: HttpClient + 'static,
        F: Future<Output = ()>,
    {
        self.config.validate()?;

        let Some(_lock) = acquire_lock(&self.config.lock_path)? else {
            info!(
                "another run holds {}, skipping",
                self.config.lock_path.display()
            );
            return Ok(RunOutcome::AlreadyRunning);
        };

        // A marker left behind by a previous failing run is only cleared
        // here, at the start of the next run.
        let failure = Marker::new(&self.config.failure_path);
        failure.clear()?;

        let cancel = CancellationToken::new();
        let channels = mirror_channels(
            &self.config,
            client,
            self.reporter.clone(),
            cancel.clone(),
        );
        tokio::pin!(channels);

        let outcomes = tokio::select! {
            outcomes = &mut channels => outcomes,
            () = shutdown => {
                warn!("interrupted, stopping channel tasks");
                cancel.cancel();
                channels.await
            }
        };

        let mut failed = false;
        for outcome in &outcomes {
            match &outcome.result {
                Ok(()) => info!("channel {} mirrored", outcome.channel),
                Err(e) => {
                    warn!("channel {} failed: {e}", outcome.channel);
                    failed = true;
                }
            }
        }

        if failed {
            failure.set()?;
            Ok(RunOutcome::Failed)
        } else {
            Ok(RunOutcome::Completed)
        }
    }
}
