//! Interactive per-file status stream.
//!
//! One symbol per file on stdout: `+` new, `~` updated, `=` unchanged.
//! Entries the engine pruned are only interesting in the detailed log, so
//! they draw nothing here.

use std::sync::atomic::{AtomicUsize, Ordering};

use console::style;

use flatmirror_engine::{MirrorEvent, Reporter};

pub struct ConsoleReporter {
    quiet: bool,
    downloaded: AtomicUsize,
    updated: AtomicUsize,
    unchanged: AtomicUsize,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            downloaded: AtomicUsize::new(0),
            updated: AtomicUsize::new(0),
            unchanged: AtomicUsize::new(0),
        }
    }

    /// Counts for the final summary line.
    pub fn summary(&self) -> String {
        format!(
            "{} new, {} updated, {} unchanged",
            self.downloaded.load(Ordering::Relaxed),
            self.updated.load(Ordering::Relaxed),
            self.unchanged.load(Ordering::Relaxed),
        )
    }
}

impl Reporter for ConsoleReporter {
    fn event(&self, event: MirrorEvent<'_>) {
        match event {
            MirrorEvent::Downloaded { path } => {
                self.downloaded.fetch_add(1, Ordering::Relaxed);
                if !self.quiet {
                    println!("{} {}", style("+").green().bold(), path.display());
                }
            }
            MirrorEvent::Updated { path } => {
                self.updated.fetch_add(1, Ordering::Relaxed);
                if !self.quiet {
                    println!("{} {}", style("~").yellow().bold(), path.display());
                }
            }
            MirrorEvent::Unchanged { path } => {
                self.unchanged.fetch_add(1, Ordering::Relaxed);
                if !self.quiet {
                    println!("{} {}", style("=").dim(), path.display());
                }
            }
            MirrorEvent::LinkUpdated { path, target } => {
                if !self.quiet {
                    println!("{} {} -> {target}", style("@").cyan(), path.display());
                }
            }
            MirrorEvent::ChannelStarted { channel } => {
                if !self.quiet {
                    println!("{} {channel}", style("::").cyan().bold());
                }
            }
            MirrorEvent::ChannelFinished { channel, failed } => {
                if failed {
                    println!("{} {channel} failed", style("!!").red().bold());
                }
            }
            MirrorEvent::Filtered { .. }
            | MirrorEvent::Excluded { .. }
            | MirrorEvent::SkippedVersion { .. } => {}
        }
    }
}
