//! HTTP access to the catalog host.
//!
//! One thin wrapper around `reqwest::Client` serves the catalog fetch, asset
//! downloads, and HEAD existence probes. Status-code interpretation lives
//! here so the flows above only see the crate's error taxonomy.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{Result, ShelfError};
use crate::models::CatalogFile;

const USER_AGENT: &str = "examshelf/0.3 (terminal catalog browser)";

/// Resolve the user agent from an optional config override.
pub fn resolve_user_agent(config: Option<&str>) -> &str {
    config.unwrap_or(USER_AGENT)
}

/// HTTP client for catalog and asset fetches.
#[derive(Clone)]
pub struct ShelfClient {
    client: Client,
}

impl ShelfClient {
    /// Create a client with the given timeout and optional user agent
    /// override.
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(resolve_user_agent(user_agent))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch and parse the catalog resource.
    ///
    /// Transport failures, non-success statuses, and malformed payloads all
    /// surface as `DataLoad`: the caller renders one error panel either way.
    pub async fn fetch_catalog(&self, url: &Url) -> Result<CatalogFile> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(ShelfError::data_load)?;
        if !response.status().is_success() {
            return Err(ShelfError::DataLoad {
                reason: format!("{} returned status {}", url, response.status()),
            });
        }
        response
            .json::<CatalogFile>()
            .await
            .map_err(ShelfError::data_load)
    }

    /// Fetch an asset as opaque bytes.
    ///
    /// A non-success status becomes `ResourceNotFound` naming the requested
    /// filename; transport failures map to `Network`.
    pub async fn fetch_bytes(&self, url: &Url, name: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ShelfError::ResourceNotFound {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Probe whether an asset is reachable without downloading it.
    pub async fn exists(&self, url: &Url) -> Result<bool> {
        let response = self.client.head(url.clone()).send().await?;
        Ok(response.status().is_success())
    }
}
