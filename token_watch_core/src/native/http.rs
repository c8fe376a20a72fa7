// Native HTTP client implementation using reqwest

use crate::error::{CoreError, CoreResult};
use crate::http_client::{HttpClient, HttpResult};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

/// Native HTTP client using reqwest
pub struct NativeHttpClient {
    client: Client,
}

impl NativeHttpClient {
    /// Every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("token-watch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::Init(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub(crate) fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait(?Send)]
impl HttpClient for NativeHttpClient {
    async fn fetch_text(&self, url: &str) -> HttpResult<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::Http(format!("HTTP request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| CoreError::Http(format!("HTTP request failed: {}", e)))?;

        response
            .text()
            .await
            .map_err(|e| CoreError::Http(format!("Failed to read response body: {}", e)))
    }
}
