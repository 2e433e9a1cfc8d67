//! Shared types for the Midjourney generation bridge
//!
//! Wire-level types only: the gateway session, the `/imagine` interaction
//! payload with its validating builder, and classification of inbound
//! attachment events. No I/O lives here.

pub mod commands;
pub mod events;
pub mod session;

pub use commands::{
    generate_nonce, CommandBuildError, GenerationOptions, GenerationRequest, ImagineInteraction,
    IMAGINE_APPLICATION_ID, IMAGINE_COMMAND_DESCRIPTION, IMAGINE_COMMAND_ID, IMAGINE_COMMAND_NAME,
    IMAGINE_COMMAND_VERSION,
};
pub use events::UPSCALE_MARKER;
pub use events::{artifact_events, has_image_extension, AttachmentRef, InboundArtifactEvent};
pub use session::{RoutingIds, Session};
