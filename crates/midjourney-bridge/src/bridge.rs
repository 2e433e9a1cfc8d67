//! Lifecycle facade composing the listener and coordinator
//!
//! `Uninitialized -> Connecting -> Ready -> Closing -> Closed`. The facade
//! owns the gateway connection: `start` spawns the listener's connection
//! loop on its own task and blocks until the ready condition fires;
//! `shutdown` tears the shards down and awaits the task.

#[path = "bridge_tests.rs"]
mod bridge_tests;

use std::sync::Arc;

use image::DynamicImage;
use serenity::gateway::ShardManager;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use midjourney_types::GenerationOptions;

use crate::config::Config;
use crate::coordinator::RequestCoordinator;
use crate::errors::{BridgeError, Result};
use crate::fetch::HttpFetcher;
use crate::listener::{Handler, ListenerState};
use crate::signal::CompletionSignal;
use crate::stager::ArtifactStager;
use crate::submit::HttpSubmitter;

/// Lifecycle state of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Connecting,
    Ready,
    Closing,
    Closed,
}

impl BridgeState {
    pub fn name(&self) -> &'static str {
        match self {
            BridgeState::Uninitialized => "uninitialized",
            BridgeState::Connecting => "connecting",
            BridgeState::Ready => "ready",
            BridgeState::Closing => "closing",
            BridgeState::Closed => "closed",
        }
    }
}

struct GatewayRuntime {
    shard_manager: Arc<ShardManager>,
    task: JoinHandle<()>,
}

/// The single public surface consumed by the orchestration pipeline:
/// `start`, `imagine`, `shutdown`.
pub struct GenerationBridge {
    config: Config,
    state: BridgeState,
    signal: Arc<CompletionSignal>,
    coordinator: RequestCoordinator<HttpSubmitter>,
    runtime: Option<GatewayRuntime>,
}

impl GenerationBridge {
    pub fn new(config: Config) -> Result<Self> {
        let session = config.session();
        let submitter = HttpSubmitter::new(&session)?;
        let signal = Arc::new(CompletionSignal::new());
        let coordinator = RequestCoordinator::new(
            submitter,
            session,
            signal.clone(),
            config.timeouts.generation_timeout(),
            config.timeouts.reject_backoff(),
        );
        Ok(Self {
            config,
            state: BridgeState::Uninitialized,
            signal,
            coordinator,
            runtime: None,
        })
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Connect to the gateway and block until it reports ready.
    pub async fn start(&mut self) -> Result<()> {
        if self.state != BridgeState::Uninitialized {
            return Err(BridgeError::InvalidState(self.state.name()));
        }
        self.state = BridgeState::Connecting;

        let fetcher = HttpFetcher::new(self.config.timeouts.download_timeout())?;
        let stager = ArtifactStager::new(&self.config.staging.root);
        let (listener, mut ready_rx) = ListenerState::new(fetcher, stager, self.signal.clone());

        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;
        let token = self.config.discord.bot_token.clone();

        let client = Client::builder(&token, intents)
            .event_handler(Handler::new(Arc::new(listener)))
            .await;
        let client = match client {
            Ok(client) => client,
            Err(e) => {
                self.state = BridgeState::Closed;
                return Err(BridgeError::Connection(format!(
                    "failed to build gateway client: {e}"
                )));
            }
        };

        let shard_manager = client.shard_manager.clone();
        let task = tokio::spawn(async move {
            let mut client = client;
            if let Err(e) = client.start().await {
                error!("gateway connection ended: {}", e);
            }
        });

        let startup = self.config.timeouts.startup_timeout();
        let became_ready = matches!(
            tokio::time::timeout(startup, ready_rx.wait_for(|ready| *ready)).await,
            Ok(Ok(_))
        );
        match became_ready {
            true => {
                self.runtime = Some(GatewayRuntime {
                    shard_manager,
                    task,
                });
                self.state = BridgeState::Ready;
                info!("generation bridge ready");
                Ok(())
            }
            false => {
                shard_manager.shutdown_all().await;
                task.abort();
                self.state = BridgeState::Closed;
                Err(BridgeError::Connection(format!(
                    "gateway not ready within {startup:?}"
                )))
            }
        }
    }

    /// Generate one image. Valid only in the `Ready` state.
    pub async fn imagine(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<DynamicImage> {
        if self.state != BridgeState::Ready {
            return Err(BridgeError::InvalidState(self.state.name()));
        }
        self.coordinator.imagine(prompt, options).await
    }

    /// Gracefully terminate the gateway connection. Idempotent.
    pub async fn shutdown(&mut self) -> Result<()> {
        match self.state {
            BridgeState::Ready | BridgeState::Connecting => {
                self.state = BridgeState::Closing;
                if let Some(runtime) = self.runtime.take() {
                    runtime.shard_manager.shutdown_all().await;
                    if let Err(e) = runtime.task.await {
                        warn!("gateway task ended abnormally: {}", e);
                    }
                }
                self.state = BridgeState::Closed;
                info!("generation bridge closed");
            }
            BridgeState::Uninitialized => {
                self.state = BridgeState::Closed;
            }
            BridgeState::Closing | BridgeState::Closed => {}
        }
        Ok(())
    }
}
