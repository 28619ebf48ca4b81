//! Conditional HTTP fetching with origin-reproducible change detection.
//!
//! The change-detection token the origin emits for a file is a pure function
//! of that file's mtime and size, so a mirror that preserves remote mtimes
//! can re-synthesize the token from local metadata alone ([`etag`]) and fetch
//! conditionally without any side-stored state ([`Downloader`]).
//!
//! HTTP transport sits behind the [`HttpClient`] trait; production uses
//! [`ReqwestClient`], tests use in-memory mocks.

mod download;
mod error;
pub mod etag;
mod http;

pub use download::{Downloader, FetchOutcome};
pub use error::{FetchError, Result};
pub use http::{BoxStream, Download, HttpClient, Probe};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
