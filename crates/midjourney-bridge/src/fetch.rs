//! Attachment download seam
//!
//! The listener fetches attachment bytes through this trait so the
//! pipeline is testable without a CDN. Fetch failures are non-fatal: the
//! listener logs and skips the attachment, and the coordinator's timeout
//! governs overall failure.

use std::time::Duration;

use crate::errors::{BridgeError, Result};

/// Blocking-style byte fetch of one attachment URL.
pub trait FetchBytes: Send + Sync {
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// HTTP fetcher with a bounded per-request timeout. No retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Connection(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl FetchBytes for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BridgeError::AttachmentFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::AttachmentFetch(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BridgeError::AttachmentFetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
