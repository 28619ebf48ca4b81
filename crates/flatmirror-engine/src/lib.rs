//! Mirror engine for HTTP-served release trees.
//!
//! The engine walks each channel's remote directory index, prunes entries
//! through the version gate and pattern filter, resolves the `current` alias
//! to a local symlink, and hands file entries to the conditional downloader.
//! One task runs per channel with strictly sequential work inside it; the
//! run coordinator owns the single-instance lock, the failure marker, and
//! interrupt propagation.

mod channel;
mod config;
mod error;
mod event;
mod filter;
pub mod gate;
pub mod listing;
mod run;
mod walk;

pub use channel::{ChannelOutcome, mirror_channels};
pub use config::{ConfigError, MirrorConfig};
pub use error::{MirrorError, Result};
pub use event::{MirrorEvent, NullReporter, Reporter};
pub use filter::NameFilter;
pub use run::{RunCoordinator, RunOutcome};
pub use walk::Walker;
