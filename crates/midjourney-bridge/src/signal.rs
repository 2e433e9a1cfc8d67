//! Single-slot completion signal between listener and coordinator
//!
//! The listener raises a [`Completion`] whenever an artifact finishes
//! staging; the coordinator waits on it with a bound and consumes it. The
//! slot holds at most one unconsumed completion, which the strict
//! one-request-at-a-time discipline guarantees is the one being waited for.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::warn;

use crate::errors::StagingError;

/// Outcome of one staged artifact: the normalized key it was staged under,
/// and either the output path or the staging failure to surface.
#[derive(Debug)]
pub struct Completion {
    pub key: String,
    pub outcome: std::result::Result<PathBuf, StagingError>,
}

/// Manually-reset, single-slot synchronization primitive.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    slot: Mutex<Option<Completion>>,
    notify: Notify,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit a completion and wake the waiter, if any.
    ///
    /// An unconsumed prior completion is overwritten: with one request in
    /// flight at a time that can only be a stale result nobody is waiting
    /// for any more.
    pub fn raise(&self, completion: Completion) {
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(old) = slot.replace(completion) {
            warn!("overwriting unconsumed completion for key '{}'", old.key);
        }
        drop(slot);
        self.notify.notify_one();
    }

    /// Wait until a completion is available or the timeout elapses,
    /// consuming the slot. Returns `None` on timeout.
    pub async fn wait_or_timeout(&self, timeout: Duration) -> Option<Completion> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(completion) = self.take() {
                return Some(completion);
            }
            // notify_one stores a permit, so a raise between the check
            // above and this await is not lost.
            let notified = self.notify.notified();
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.take();
            }
        }
    }

    /// Discard any unconsumed completion. Called on timeout so a
    /// late-arriving result cannot satisfy a future wait.
    pub fn drain(&self) {
        self.slot
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
    }

    fn take(&self) -> Option<Completion> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner()).take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ok_completion(key: &str) -> Completion {
        Completion {
            key: key.to_string(),
            outcome: Ok(PathBuf::from(format!("output/{key}"))),
        }
    }

    #[tokio::test]
    async fn test_raise_then_wait() {
        let signal = CompletionSignal::new();
        signal.raise(ok_completion("fox.jpg"));
        let completion = signal
            .wait_or_timeout(Duration::from_millis(50))
            .await
            .expect("completion available");
        assert_eq!(completion.key, "fox.jpg");
    }

    #[tokio::test]
    async fn test_wait_then_raise_from_other_task() {
        let signal = Arc::new(CompletionSignal::new());
        let raiser = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            raiser.raise(ok_completion("fox.jpg"));
        });
        let completion = signal
            .wait_or_timeout(Duration::from_secs(2))
            .await
            .expect("completion arrives");
        assert_eq!(completion.key, "fox.jpg");
    }

    #[tokio::test]
    async fn test_wait_times_out_empty() {
        let signal = CompletionSignal::new();
        let got = signal.wait_or_timeout(Duration::from_millis(20)).await;
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_single_slot_overwrite() {
        let signal = CompletionSignal::new();
        signal.raise(ok_completion("stale.jpg"));
        signal.raise(ok_completion("fresh.jpg"));
        let completion = signal
            .wait_or_timeout(Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(completion.key, "fresh.jpg");
        // Slot is empty again.
        assert!(signal.wait_or_timeout(Duration::from_millis(10)).await.is_none());
    }

    #[tokio::test]
    async fn test_drain_discards_pending() {
        let signal = CompletionSignal::new();
        signal.raise(ok_completion("late.jpg"));
        signal.drain();
        assert!(signal.wait_or_timeout(Duration::from_millis(10)).await.is_none());
    }

    #[tokio::test]
    async fn test_wait_consumes_once() {
        let signal = CompletionSignal::new();
        signal.raise(ok_completion("one.jpg"));
        assert!(signal.wait_or_timeout(Duration::from_millis(10)).await.is_some());
        assert!(signal.wait_or_timeout(Duration::from_millis(10)).await.is_none());
    }
}
