//! Synchronous Generation Bridge for Midjourney over the Discord gateway
//!
//! Turns the asynchronous, event-driven gateway protocol (submit an
//! `/imagine` interaction; receive results later as unsolicited message
//! events) into a blocking call `imagine(prompt) -> image` safe to invoke
//! sequentially from an orchestration loop.
//!
//! The bridge is strictly one-request-at-a-time: a second `imagine` call
//! while one is in flight fails fast with [`BridgeError::RequestInFlight`].
//! This discipline substitutes for true request correlation, since the
//! remote protocol does not reliably echo request identity in result events.

pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod fetch;
pub mod keys;
pub mod listener;
pub mod mock;
pub mod signal;
pub mod stager;
pub mod submit;
pub mod tiler;

pub use bridge::{BridgeState, GenerationBridge};
pub use config::Config;
pub use coordinator::RequestCoordinator;
pub use errors::{BridgeError, Result, StagingError};
pub use fetch::{FetchBytes, HttpFetcher};
pub use listener::{Handler, ListenerState};
pub use signal::{Completion, CompletionSignal};
pub use stager::ArtifactStager;
pub use submit::{HttpSubmitter, Submit};

pub use midjourney_types::GenerationOptions;
