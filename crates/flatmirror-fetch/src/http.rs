use std::future::Future;
use std::pin::Pin;
use std::time::SystemTime;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Result of a conditional metadata probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The origin reported 304; the local copy is current.
    Unchanged,
    /// The resource differs from the presented validator.
    Modified,
}

/// An open streaming download.
pub struct Download<E> {
    /// The response body.
    pub body: BoxStream<'static, std::result::Result<Bytes, E>>,
    /// Modification time reported by the origin, when present.
    pub last_modified: Option<SystemTime>,
}

/// Asynchronous HTTP client abstraction.
///
/// The minimal surface the mirror needs: listing/marker text, a conditional
/// metadata probe, and a streaming body. Implementations handle their own
/// redirect following, timeouts, and status mapping; any non-success status
/// surfaces as `Self::Error`.
///
/// Production uses [`ReqwestClient`]; tests supply in-memory mocks.
pub trait HttpClient: Send + Sync {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a resource body as text (directory listings, version markers).
    fn get_text(&self, url: &str)
    -> impl Future<Output = std::result::Result<String, Self::Error>> + Send;

    /// Issue a conditional metadata request carrying `validator` as the
    /// conditional-request token.
    fn probe(
        &self,
        url: &str,
        validator: &str,
    ) -> impl Future<Output = std::result::Result<Probe, Self::Error>> + Send;

    /// Open a streaming download of the resource body.
    fn download(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<Download<Self::Error>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use std::time::Duration;

    use reqwest::{StatusCode, header};

    /// Production HTTP client implementation using reqwest.
    ///
    /// Transport-level retry and timeout policy lives here; callers above
    /// never retry.
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(30))
                .build()?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
            let response = self.client.get(url).send().await?.error_for_status()?;
            response.text().await
        }

        async fn probe(&self, url: &str, validator: &str) -> Result<Probe, reqwest::Error> {
            let response = self
                .client
                .head(url)
                .header(header::IF_NONE_MATCH, validator)
                .send()
                .await?;
            if response.status() == StatusCode::NOT_MODIFIED {
                return Ok(Probe::Unchanged);
            }
            response.error_for_status()?;
            Ok(Probe::Modified)
        }

        async fn download(&self, url: &str) -> Result<Download<reqwest::Error>, reqwest::Error> {
            let response = self.client.get(url).send().await?.error_for_status()?;
            let last_modified = response
                .headers()
                .get(header::LAST_MODIFIED)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_http_date);
            Ok(Download {
                body: Box::pin(response.bytes_stream()),
                last_modified,
            })
        }
    }

    fn parse_http_date(value: &str) -> Option<SystemTime> {
        chrono::DateTime::parse_from_rfc2822(value)
            .ok()
            .map(SystemTime::from)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::time::{Duration, UNIX_EPOCH};

        #[test]
        fn test_parse_http_date() {
            let parsed = parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
            assert_eq!(parsed, UNIX_EPOCH + Duration::from_secs(1_445_412_480));
        }

        #[test]
        fn test_parse_http_date_rejects_garbage() {
            assert!(parse_http_date("not a date").is_none());
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
