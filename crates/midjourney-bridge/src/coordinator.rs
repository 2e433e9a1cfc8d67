//! Request coordinator: the blocking `imagine` contract
//!
//! Issues the generation command over the interaction endpoint, then waits
//! for the completion signal the listener raises once the artifact is
//! staged. The signal is raised only after staging finishes, so the load
//! here never races the stager's write.

#[path = "coordinator_tests.rs"]
mod coordinator_tests;

use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use tracing::{debug, warn};

use midjourney_types::{
    GenerationOptions, GenerationRequest, ImagineInteraction, Session,
};

use crate::errors::{BridgeError, Result, StagingError};
use crate::keys::prompt_key;
use crate::signal::CompletionSignal;
use crate::submit::Submit;

/// Coordinates one generation request at a time against the remote service.
pub struct RequestCoordinator<S: Submit> {
    submitter: S,
    session: Session,
    signal: Arc<CompletionSignal>,
    generation_timeout: Duration,
    reject_backoff: Duration,
    // Held for the duration of one imagine call; a second caller fails
    // fast instead of racing the shared completion signal.
    in_flight: tokio::sync::Mutex<()>,
}

impl<S: Submit> RequestCoordinator<S> {
    pub fn new(
        submitter: S,
        session: Session,
        signal: Arc<CompletionSignal>,
        generation_timeout: Duration,
        reject_backoff: Duration,
    ) -> Self {
        Self {
            submitter,
            session,
            signal,
            generation_timeout,
            reject_backoff,
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Submit an `/imagine` command and block until the staged result is
    /// loaded, the bounded wait elapses, or the submission is rejected.
    pub async fn imagine(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<DynamicImage> {
        let _in_flight = self
            .in_flight
            .try_lock()
            .map_err(|_| BridgeError::RequestInFlight)?;

        let request = GenerationRequest::new(prompt, options);
        let payload = ImagineInteraction::builder(&self.session)
            .request(request)
            .build()?;

        let status = match self.submitter.submit(&payload).await {
            Ok(status) => status,
            Err(e) => {
                warn!("interaction submission failed: {}", e);
                tokio::time::sleep(self.reject_backoff).await;
                return Err(BridgeError::RemoteRejected { status: 0 });
            }
        };
        if !(200u16..300).contains(&status) {
            warn!("interaction submission rejected with HTTP {}", status);
            tokio::time::sleep(self.reject_backoff).await;
            return Err(BridgeError::RemoteRejected { status });
        }

        let expected = prompt_key(prompt);
        debug!("command accepted, waiting for artifact '{}'", expected);

        let deadline = tokio::time::Instant::now() + self.generation_timeout;
        let completion = loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let Some(completion) = self.signal.wait_or_timeout(remaining).await else {
                // A result may still arrive after this point; drain so it
                // cannot satisfy the next call's wait.
                self.signal.drain();
                return Err(BridgeError::GenerationTimeout(self.generation_timeout));
            };
            if completion.key == expected {
                break completion;
            }
            debug!(
                "discarding stale completion '{}' (expected '{}')",
                completion.key, expected
            );
        };

        let path = completion.outcome.map_err(BridgeError::Staging)?;
        let image = image::open(&path).map_err(|e| BridgeError::Staging(StagingError::Image(e)))?;
        Ok(image)
    }
}
