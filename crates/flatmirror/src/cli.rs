//! Command-line surface and configuration assembly.
//!
//! Flags sit above the optional TOML config file, hard defaults below both.
//! Everything here reduces to one [`MirrorConfig`] handed to the engine.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use flatmirror_engine::{MirrorConfig, NameFilter};

const DEFAULT_HOST: &str = "release.flatcar-linux.net";
const DEFAULT_CHANNELS: &[&str] = &["stable", "beta", "alpha", "edge"];

#[derive(Debug, Parser)]
#[command(
    name = "flatmirror",
    version = env!("CARGO_PKG_VERSION"),
    about = "Incremental mirror for Flatcar release channels",
    long_about = None
)]
pub struct Cli {
    /// Local mirror root; one subdirectory is kept per channel
    pub root: Option<PathBuf>,

    /// Channel to mirror (repeatable)
    #[arg(short, long = "channel", value_name = "NAME")]
    pub channels: Vec<String>,

    /// Skip version directories below this release number
    #[arg(long, value_name = "VERSION")]
    pub min_version: Option<u64>,

    /// Skip listing entries matching this pattern
    #[arg(long, value_name = "REGEX", conflicts_with = "only")]
    pub exclude: Option<String>,

    /// Download only files whose name matches this pattern
    #[arg(long, value_name = "REGEX")]
    pub only: Option<String>,

    /// Remote host; each channel resolves to https://<channel>.<host>/
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Append detailed logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Single-instance lock marker
    #[arg(long, value_name = "PATH")]
    pub lock_file: Option<PathBuf>,

    /// Marker left in place after a failing run
    #[arg(long, value_name = "PATH")]
    pub failure_marker: Option<PathBuf>,

    /// TOML config file; flags take precedence over its values
    #[arg(short = 'C', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress the per-file status stream
    #[arg(short, long)]
    pub quiet: bool,
}

/// The subset of settings a config file may carry.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    root: Option<PathBuf>,
    channels: Option<Vec<String>>,
    min_version: Option<u64>,
    exclude: Option<String>,
    only: Option<String>,
    host: Option<String>,
    log_file: Option<PathBuf>,
    lock_file: Option<PathBuf>,
    failure_marker: Option<PathBuf>,
}

impl FileConfig {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Fully resolved process settings.
#[derive(Debug)]
pub struct Settings {
    pub mirror: MirrorConfig,
    pub log_file: Option<PathBuf>,
    pub quiet: bool,
}

impl Cli {
    pub fn into_settings(self) -> anyhow::Result<Settings> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let root = self
            .root
            .or(file.root)
            .context("no mirror root configured (pass a path or set `root` in the config file)")?;
        let channels = if self.channels.is_empty() {
            file.channels.unwrap_or_else(default_channels)
        } else {
            self.channels
        };
        let exclude = self.exclude.or(file.exclude);
        let only = self.only.or(file.only);
        let filter = NameFilter::from_patterns(exclude.as_deref(), only.as_deref())?;

        let mirror = MirrorConfig {
            host: self.host.or(file.host).unwrap_or_else(|| DEFAULT_HOST.into()),
            channels,
            root,
            version_floor: self.min_version.or(file.min_version),
            filter,
            lock_path: self
                .lock_file
                .or(file.lock_file)
                .unwrap_or_else(|| std::env::temp_dir().join("flatmirror.lock")),
            failure_path: self
                .failure_marker
                .or(file.failure_marker)
                .unwrap_or_else(|| std::env::temp_dir().join("flatmirror.failed")),
        };
        mirror.validate()?;

        Ok(Settings {
            mirror,
            log_file: self.log_file.or(file.log_file),
            quiet: self.quiet,
        })
    }
}

fn default_channels() -> Vec<String> {
    DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect()
}
