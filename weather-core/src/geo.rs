//! Approximate location lookup from the caller's public IP address.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[async_trait]
pub trait IpLocator: Send + Sync {
    /// Returns the detected city, or `None` when the service could not place the address.
    async fn detect_city(&self) -> Result<Option<String>>;
}

/// Client for the ip-api.com JSON endpoint.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl IpApiLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: impl Into<String>, http: Client) -> Self {
        Self { url: url.into(), http }
    }
}

#[async_trait]
impl IpLocator for IpApiLocator {
    async fn detect_city(&self) -> Result<Option<String>> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Failed to connect to IP geolocation service")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("IP geolocation service responded with status {status}"));
        }

        let parsed: IpApiResponse =
            res.json().await.context("Failed to parse IP geolocation response")?;

        if parsed.status != "success" {
            debug!(message = ?parsed.message, "IP geolocation returned no match");
            return Ok(None);
        }

        Ok(parsed.city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()))
    }
}
