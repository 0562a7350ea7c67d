//! Source image downloads.

use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::error::Result;

/// Downloads raw source images over HTTP.
///
/// Every request is bounded by the configured timeout so an unresponsive
/// image host cannot stall a resolution.
#[derive(Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Download `url`, failing on transport errors and non-2xx responses.
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        let data = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        debug!(url = %url, size = data.len(), "Downloaded source image");
        Ok(data)
    }
}
