//! In-memory transport doubles for unit testing without the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use midjourney_types::ImagineInteraction;

use crate::errors::{BridgeError, Result};
use crate::fetch::FetchBytes;
use crate::submit::Submit;

/// Submitter that records every payload and answers with a fixed status.
#[derive(Debug, Clone)]
pub struct MockSubmitter {
    status: u16,
    payloads: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MockSubmitter {
    /// Accepts every submission with HTTP 204.
    pub fn accepting() -> Self {
        Self::with_status(204)
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of all submitted payloads, serialized, in order.
    pub fn submitted(&self) -> Vec<serde_json::Value> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn submit_count(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

impl Submit for MockSubmitter {
    async fn submit(&self, payload: &ImagineInteraction) -> Result<u16> {
        let value = serde_json::to_value(payload)
            .map_err(|e| BridgeError::Connection(e.to_string()))?;
        self.payloads.lock().unwrap().push(value);
        Ok(self.status)
    }
}

/// Fetcher answering from a url → bytes map; unknown URLs fail.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, bytes: Vec<u8>) {
        self.responses.lock().unwrap().insert(url.into(), bytes);
    }
}

impl FetchBytes for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| BridgeError::AttachmentFetch(format!("no mock response for {url}")))
    }
}
