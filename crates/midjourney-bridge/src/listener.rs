//! Gateway listener: inbound message events → staged artifacts
//!
//! Runs on the gateway connection independently of the coordinator. Every
//! inbound message is classified; image attachments are fetched, staged,
//! and announced on the completion signal exactly once per finished
//! artifact.

#[path = "listener_tests.rs"]
mod listener_tests;

use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::GetMessages;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use tokio::sync::watch;
use tracing::{error, info, warn};

use midjourney_types::{artifact_events, AttachmentRef, InboundArtifactEvent};

use crate::fetch::FetchBytes;
use crate::keys::normalize_key;
use crate::signal::{Completion, CompletionSignal};
use crate::stager::ArtifactStager;

/// Prefix of the history-replay side channel: `history:N` re-walks the last
/// N messages of the channel through the attachment pipeline. Backfill
/// only, not part of the live request path.
const HISTORY_PREFIX: &str = "history:";

/// Page limit of the gateway's channel-history call.
const HISTORY_PAGE_LIMIT: u64 = 100;

/// Listener-side state shared with the gateway event handler.
pub struct ListenerState<F: FetchBytes> {
    fetcher: F,
    stager: ArtifactStager,
    signal: Arc<CompletionSignal>,
    ready_tx: watch::Sender<bool>,
}

impl<F: FetchBytes> ListenerState<F> {
    /// Returns the state plus the receiver half of the ready condition the
    /// bridge blocks on during startup.
    pub fn new(
        fetcher: F,
        stager: ArtifactStager,
        signal: Arc<CompletionSignal>,
    ) -> (Self, watch::Receiver<bool>) {
        let (ready_tx, ready_rx) = watch::channel(false);
        (
            Self {
                fetcher,
                stager,
                signal,
                ready_tx,
            },
            ready_rx,
        )
    }

    /// Signal the process-wide ready condition. Called from the gateway's
    /// ready event.
    pub fn mark_ready(&self) {
        self.ready_tx.send_replace(true);
    }

    /// Feed one message's content and attachments through the pipeline.
    pub async fn handle_message(&self, content: &str, attachments: &[AttachmentRef]) {
        for event in artifact_events(content, attachments) {
            self.handle_artifact(&event).await;
        }
    }

    async fn handle_artifact(&self, event: &InboundArtifactEvent) {
        let key = normalize_key(&event.raw_filename, event.is_upscale_variant);

        let bytes = match self.fetcher.fetch(&event.attachment_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                // Transient; the coordinator's timeout governs overall failure.
                warn!("skipping attachment '{}': {}", event.raw_filename, e);
                return;
            }
        };

        let stager = self.stager.clone();
        let stage_key = key.clone();
        let is_upscale = event.is_upscale_variant;
        let staged =
            tokio::task::spawn_blocking(move || stager.stage(&bytes, &stage_key, is_upscale))
                .await;

        match staged {
            Ok(Ok(path)) => {
                info!("artifact ready: {}", path.display());
                self.signal.raise(Completion {
                    key,
                    outcome: Ok(path),
                });
            }
            Ok(Err(e)) => {
                // Fatal to the current request; surfaced through the signal.
                error!("staging failed for '{}': {}", key, e);
                self.signal.raise(Completion {
                    key,
                    outcome: Err(e),
                });
            }
            Err(e) => error!("staging task failed for '{}': {}", key, e),
        }
    }
}

fn attachment_refs(message: &Message) -> Vec<AttachmentRef> {
    message
        .attachments
        .iter()
        .map(|a| AttachmentRef {
            url: a.url.clone(),
            filename: a.filename.clone(),
        })
        .collect()
}

/// Serenity event handler wrapping [`ListenerState`].
pub struct Handler<F: FetchBytes + 'static> {
    state: Arc<ListenerState<F>>,
}

impl<F: FetchBytes + 'static> Handler<F> {
    pub fn new(state: Arc<ListenerState<F>>) -> Self {
        Self { state }
    }

    async fn replay_history(&self, ctx: &Context, channel_id: ChannelId, count: u64) {
        let limit = count.min(HISTORY_PAGE_LIMIT) as u8;
        info!("replaying the last {} messages of {}", limit, channel_id);
        match channel_id
            .messages(&ctx.http, GetMessages::new().limit(limit))
            .await
        {
            Ok(messages) => {
                for message in messages {
                    self.state
                        .handle_message(&message.content, &attachment_refs(&message))
                        .await;
                }
            }
            Err(e) => error!("history replay for {} failed: {}", channel_id, e),
        }
    }
}

#[async_trait]
impl<F: FetchBytes + 'static> EventHandler for Handler<F> {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("gateway connected as {}", ready.user.name);
        self.state.mark_ready();
    }

    async fn message(&self, ctx: Context, msg: Message) {
        self.state
            .handle_message(&msg.content, &attachment_refs(&msg))
            .await;

        if let Some(rest) = msg.content.strip_prefix(HISTORY_PREFIX) {
            match rest.trim().parse::<u64>() {
                Ok(count) => self.replay_history(&ctx, msg.channel_id, count).await,
                Err(_) => warn!("ignoring malformed history request: '{}'", msg.content),
            }
        }
    }
}
