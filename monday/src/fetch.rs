//! HTTP client for requesting a snapshot from an agent.

use std::time::Duration;

use monday_agent::types::Snapshot;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::ServerEntry;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("port {0} is out of range")]
    InvalidPort(i32),
    #[error("invalid target url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("agent answered {0} without a snapshot")]
    Status(StatusCode),
    #[error("malformed snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}

/// `http://host:port/` for an entry, applying the default port.
pub fn target_url(entry: &ServerEntry) -> Result<Url, FetchError> {
    let port = entry
        .effective_port()
        .ok_or(FetchError::InvalidPort(entry.port.unwrap_or_default()))?;
    let host = entry.host.trim();
    // Bare IPv6 literals need brackets inside a URL.
    let url = if host.contains(':') && !host.starts_with('[') {
        format!("http://[{host}]:{port}/")
    } else {
        format!("http://{host}:{port}/")
    };
    Ok(Url::parse(&url)?)
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Every request made through this fetcher gives up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, entry: &ServerEntry) -> Result<Snapshot, FetchError> {
        let url = target_url(entry)?;
        debug!(server = %entry.name, %url, "requesting snapshot");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        // A proxy or an older agent may still carry a snapshot on an error status.
        warn!(server = %entry.name, %status, "agent answered with an error status");
        serde_json::from_slice(&body).map_err(|e| {
            debug!(server = %entry.name, "error body is not a snapshot: {e}");
            FetchError::Status(status)
        })
    }
}
