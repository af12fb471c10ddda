//! # Web Gateway
//!
//! reqwest-backed implementation of the web access seam used by the
//! browse_url and search_web actions.

use anyhow::{Context as AnyhowContext, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::domain::traits::WebGateway;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// HTTP client reused across requests.
pub struct HttpGateway {
    client: Client,
}

impl HttpGateway {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    fn search_url(query: &str) -> String {
        format!(
            "https://www.google.com/search?q={}",
            query.replace(' ', "+")
        )
    }
}

#[async_trait]
impl WebGateway for HttpGateway {
    async fn open_url(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Failed to open URL: {}", e))?;
        let status = response.status();
        debug!(url, %status, "fetched url");
        Ok(format!("HTTP {}", status))
    }

    async fn search(&self, query: &str) -> Result<String, String> {
        let url = Self::search_url(query);
        self.open_url(&url).await
    }
}
