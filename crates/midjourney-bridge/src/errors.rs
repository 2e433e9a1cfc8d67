//! Error types for the generation bridge
//!
//! Failures that affect the in-flight request's correctness (rejection,
//! timeout, staging failure) are distinct variants so the orchestration
//! layer can decide retry vs. abort. Transient failures inside the listener
//! (attachment fetches) are logged and skipped, not surfaced.

use std::time::Duration;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error types for bridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Gateway unreachable or auth rejected. Fatal to startup, not retried.
    #[error("gateway connection failed: {0}")]
    Connection(String),

    /// The submission call returned a non-success status. The caller should
    /// back off and may retry the whole `imagine` call. Status 0 means the
    /// request failed at the transport level before any status was received.
    #[error("generation command rejected by remote service (HTTP {status})")]
    RemoteRejected { status: u16 },

    /// No completion arrived within the bound.
    #[error("no generation result within {0:?}")]
    GenerationTimeout(Duration),

    /// Download of one attachment failed. Logged and skipped inside the
    /// listener; only surfaced by the HTTP fetcher itself.
    #[error("attachment fetch failed: {0}")]
    AttachmentFetch(String),

    /// Filesystem or image failure while staging. Fatal to the current
    /// request, not retried automatically.
    #[error("staging failed: {0}")]
    Staging(#[from] StagingError),

    /// A second `imagine` call was issued while one was outstanding.
    #[error("a generation request is already in flight")]
    RequestInFlight,

    /// Operation invoked outside the lifecycle state that permits it.
    #[error("bridge is not in a valid state for this operation (state: {0})")]
    InvalidState(&'static str),

    #[error("invalid command payload: {0}")]
    Command(#[from] midjourney_types::CommandBuildError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Filesystem / image errors raised while staging an artifact.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
