//! Interaction submission seam
//!
//! The generation command goes out over the platform's interaction
//! endpoint, authenticated with the user session rather than the listener's
//! bot identity — the remote service only accepts the command from a user
//! session. [`Submit`] abstracts the POST so the coordinator is testable
//! without the network.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, COOKIE, USER_AGENT};

use midjourney_types::{ImagineInteraction, Session};

use crate::errors::{BridgeError, Result};

/// Interaction submission endpoint.
pub const INTERACTIONS_URL: &str = "https://discord.com/api/v9/interactions";

/// Submit an interaction payload; returns the HTTP status code.
pub trait Submit: Send + Sync {
    fn submit(
        &self,
        payload: &ImagineInteraction,
    ) -> impl std::future::Future<Output = Result<u16>> + Send;
}

/// HTTP submitter carrying the session's credential headers.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    url: String,
}

impl HttpSubmitter {
    pub fn new(session: &Session) -> Result<Self> {
        Self::with_url(session, INTERACTIONS_URL)
    }

    /// Same as [`HttpSubmitter::new`] with an explicit endpoint, for tests.
    pub fn with_url(session: &Session, url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            AUTHORIZATION,
            header_value("auth token", &session.auth_token)?,
        );
        headers.insert(COOKIE, header_value("cookie", &session.cookie)?);
        headers.insert(USER_AGENT, header_value("user agent", &session.user_agent)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BridgeError::Connection(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| BridgeError::Connection(format!("invalid {name} header value")))
}

impl Submit for HttpSubmitter {
    async fn submit(&self, payload: &ImagineInteraction) -> Result<u16> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}
