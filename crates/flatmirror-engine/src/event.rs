//! Observable per-entry events.

use std::path::Path;

/// What the engine just did, for status streams and summaries.
///
/// Detailed diagnostics go through `tracing`; these events exist so a
/// front-end can render per-file progress markers without parsing logs.
#[derive(Debug, Clone, Copy)]
pub enum MirrorEvent<'a> {
    ChannelStarted { channel: &'a str },
    ChannelFinished { channel: &'a str, failed: bool },
    /// A file with no local copy was downloaded.
    Downloaded { path: &'a Path },
    /// A stale local copy was replaced.
    Updated { path: &'a Path },
    /// The origin reported the local copy current.
    Unchanged { path: &'a Path },
    /// A file name missed the include-only pattern.
    Filtered { path: &'a Path },
    /// A listing entry matched the exclude pattern.
    Excluded { name: &'a str },
    /// A version directory fell below the configured floor.
    SkippedVersion { name: &'a str },
    /// The `current` alias was repointed.
    LinkUpdated { path: &'a Path, target: &'a str },
}

pub trait Reporter: Send + Sync {
    fn event(&self, event: MirrorEvent<'_>);
}

/// Reporter that discards every event.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn event(&self, _event: MirrorEvent<'_>) {}
}
