use std::time::Duration;

use crate::core::config::DEFAULT_RELEASE_TIMEOUT_SECS;
use crate::core::error::{Error, Result};
use crate::dto::release::ReleasePayloadDto;

pub struct ReleaseImageService {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for ReleaseImageService {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_RELEASE_TIMEOUT_SECS))
    }
}

impl ReleaseImageService {
    pub fn new(timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), timeout)
    }

    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches the release document at `source_url` and returns its `pullSpec`.
    ///
    /// The deadline covers the request and the body read. A non-2xx response
    /// fails with [`Error::UnexpectedStatus`] before the body is read. The pull
    /// spec is returned as found, an absent or `null` field yields an empty string.
    pub async fn resolve(&self, source_url: &str) -> Result<String> {
        tokio::time::timeout(self.timeout, self.fetch_pull_spec(source_url))
            .await
            .map_err(|_elapsed| Error::Timeout {
                url: String::from(source_url),
                timeout: self.timeout,
            })?
    }

    async fn fetch_pull_spec(&self, source_url: &str) -> Result<String> {
        log::debug!("Fetching release image from {source_url}");
        let res = self.client.get(source_url)
            .send()
            .await
            .map_err(|source| Error::Network { url: String::from(source_url), source })?;

        if !res.status().is_success() {
            return Err(Error::UnexpectedStatus {
                url: String::from(source_url),
                status: res.status(),
            });
        }

        let body = res.bytes().await.map_err(Error::BodyRead)?;
        let payload = ReleasePayloadDto::from_slice(&body).map_err(Error::Decode)?;
        Ok(payload.into_pull_spec())
    }
}
