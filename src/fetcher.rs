//! Telemetry fetcher for the AxeOS management API
//!
//! Every failure mode (connection refused, timeout, non-2xx status, malformed
//! body) collapses into `None`. Callers treat a missing reading as "skip".

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use crate::MinerInfo;

/// Path of the system info endpoint on every device
pub const SYSTEM_INFO_PATH: &str = "/api/system/info";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Anything that can produce a reading for an address.
///
/// Implemented over HTTP by [`HttpFetcher`]; tests use simulated devices.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch(&self, address: &str) -> Option<MinerInfo>;
}

/// Fetches readings over plain HTTP, reusing one client for all requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client })
    }

    pub fn url_for(address: &str) -> String {
        format!("http://{address}{SYSTEM_INFO_PATH}")
    }

    /// Fetch with the failure reason kept, for logging.
    #[instrument(skip(self))]
    pub async fn try_fetch(&self, address: &str) -> Result<MinerInfo> {
        let url = Self::url_for(address);

        trace!("requesting {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to send HTTP request")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("failed to read response body")?;

        let mut info: MinerInfo =
            serde_json::from_str(&body).context("failed to parse system info JSON")?;
        info.ip = address.to_string();

        Ok(info)
    }
}

#[async_trait]
impl TelemetrySource for HttpFetcher {
    async fn fetch(&self, address: &str) -> Option<MinerInfo> {
        match self.try_fetch(address).await {
            Ok(info) => Some(info),
            Err(e) => {
                debug!("{address}: no reading: {e:#}");
                None
            }
        }
    }
}
