use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::Fetch;
use anyhow::{Result, bail};

/// HTTP fetcher for remote resources
pub struct HttpFetcher {
    client: Client,
    transferred_bytes: AtomicU64,
    max_retry: u32,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with a 30 second request timeout
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self::with_client(client))
    }

    /// Create a fetcher around a preconfigured client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            transferred_bytes: AtomicU64::new(0),
            max_retry: 10,
        }
    }

    /// Set how many times a timed out or refused request is attempted
    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry.max(1);
        self
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut retry_count = 0;

        loop {
            match self.client.get(url).send().await {
                Ok(resp) => {
                    if !resp.status().is_success() {
                        bail!("HTTP request for {} failed with status: {}", url, resp.status());
                    }

                    let bytes = resp.bytes().await?;
                    self.transferred_bytes
                        .fetch_add(bytes.len() as u64, Ordering::Relaxed);
                    return Ok(bytes.to_vec());
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        bail!("Max retries exceeded for {}", url);
                    }
                    warn!(
                        "Connection error, retry {}/{}: {}",
                        retry_count, self.max_retry, e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
