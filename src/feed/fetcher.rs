//! Retrieval of the raw feed payload.

use super::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Retrieves the raw feed payload from `location`. Implementations make a
/// single attempt; retrying is left to whoever triggers the ingestion.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetches the feed over HTTP(S).
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

fn transport_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(error)
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        debug!("Fetching feed from {}", location);
        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e)
            }
        })?;
        debug!("Fetched {} bytes of feed", body.len());
        Ok(body.to_vec())
    }
}

/// Reads the feed from a local file, for offline ingestion.
pub struct FileFeedFetcher;

#[async_trait]
impl FeedFetcher for FileFeedFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        debug!("Reading feed from file {}", location);
        Ok(tokio::fs::read(location).await?)
    }
}
