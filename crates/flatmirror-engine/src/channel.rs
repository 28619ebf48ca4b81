//! Concurrent per-channel dispatch.
//!
//! One task per channel; traversal inside a channel is strictly sequential,
//! which bounds connections to the origin at one per channel and keeps local
//! writes race-free. Channels write disjoint subtrees, so no ordering holds
//! (or is needed) across them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::error;

use flatmirror_fetch::HttpClient;

use crate::config::MirrorConfig;
use crate::error::MirrorError;
use crate::event::{MirrorEvent, Reporter};
use crate::walk::Walker;

/// One channel's independently captured walk result.
#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel: String,
    pub result: Result<(), MirrorError>,
}

impl ChannelOutcome {
    pub fn failed(&self) -> bool {
        self.result.is_err()
    }
}

/// Mirror every configured channel concurrently.
///
/// Each channel's outcome is captured independently: a failure in one
/// neither cancels nor affects any other. Returns after all walks have
/// finished, in completion order.
pub async fn mirror_channels<C: HttpClient + 'static>(
    config: &MirrorConfig,
    client: Arc<C>,
    reporter: Arc<dyn Reporter>,
    cancel: CancellationToken,
) -> Vec<ChannelOutcome> {
    let mut tasks = JoinSet::new();
    let mut names = HashMap::new();

    for channel in &config.channels {
        let url = config.channel_url(channel);
        let dir = config.root.join(channel);
        let walker = Walker::new(
            client.clone(),
            config.filter.clone(),
            config.version_floor,
            reporter.clone(),
            cancel.clone(),
        );
        let reporter = reporter.clone();
        let name = channel.clone();
        let channel = channel.clone();

        let handle = tasks.spawn(async move {
            reporter.event(MirrorEvent::ChannelStarted { channel: &channel });
            let result = match tokio::fs::create_dir_all(&dir).await {
                Ok(()) => walker.walk(&url, &dir).await,
                Err(e) => Err(MirrorError::CreateDir {
                    path: dir,
                    source: e,
                }),
            };
            reporter.event(MirrorEvent::ChannelFinished {
                channel: &channel,
                failed: result.is_err(),
            });
            ChannelOutcome { channel, result }
        });
        names.insert(handle.id(), name);
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, outcome)) => outcomes.push(outcome),
            Err(e) => {
                let channel = names
                    .get(&e.id())
                    .cloned()
                    .unwrap_or_else(|| "?".to_string());
                error!("channel {channel} task died: {e}");
                outcomes.push(ChannelOutcome {
                    channel,
                    result: Err(MirrorError::Task(e)),
                });
            }
        }
    }
    outcomes
}
