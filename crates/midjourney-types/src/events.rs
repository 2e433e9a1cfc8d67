//! Classification of inbound gateway message events
//!
//! A result message from the remote service carries one or more image
//! attachments. The message text distinguishes a fresh multi-tile grid from
//! an upscaled single image: upscale results contain [`UPSCALE_MARKER`] in
//! the content.

use serde::{Deserialize, Serialize};

/// Marker text present in messages announcing an upscaled result.
pub const UPSCALE_MARKER: &str = "Upscaled by";

const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".gif"];

/// Narrow view of a gateway attachment: just what the pipeline needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentRef {
    pub url: String,
    pub filename: String,
}

/// One image attachment extracted from a gateway message, classified by
/// variant kind. Ephemeral; consumed immediately by the stager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundArtifactEvent {
    pub attachment_url: String,
    pub raw_filename: String,
    pub is_upscale_variant: bool,
}

/// Returns true if the filename carries a recognised image extension.
pub fn has_image_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Classify a message's attachments into artifact events.
///
/// Non-image attachments are dropped. The upscale flag is derived from the
/// message content, so it applies to every attachment of the message.
pub fn artifact_events(content: &str, attachments: &[AttachmentRef]) -> Vec<InboundArtifactEvent> {
    let is_upscale = content.contains(UPSCALE_MARKER);
    attachments
        .iter()
        .filter(|a| has_image_extension(&a.filename))
        .map(|a| InboundArtifactEvent {
            attachment_url: a.url.clone(),
            raw_filename: a.filename.clone(),
            is_upscale_variant: is_upscale,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn att(url: &str, filename: &str) -> AttachmentRef {
        AttachmentRef {
            url: url.to_string(),
            filename: filename.to_string(),
        }
    }

    #[test]
    fn test_image_extensions() {
        assert!(has_image_extension("a.png"));
        assert!(has_image_extension("B.JPG"));
        assert!(has_image_extension("c.jpeg"));
        assert!(has_image_extension("d.gif"));
        assert!(!has_image_extension("notes.txt"));
        assert!(!has_image_extension("archive.zip"));
        assert!(!has_image_extension("png"));
    }

    #[test]
    fn test_grid_message_classified_as_fresh_result() {
        let events = artifact_events(
            "**a red fox --s 100** - <@123> (fast)",
            &[att("https://cdn/x.png", "user_a_red_fox_123.png")],
        );
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_upscale_variant);
        assert_eq!(events[0].raw_filename, "user_a_red_fox_123.png");
        assert_eq!(events[0].attachment_url, "https://cdn/x.png");
    }

    #[test]
    fn test_upscale_marker_flags_all_attachments() {
        let events = artifact_events(
            "**a red fox** - Upscaled by <@123> (fast)",
            &[
                att("https://cdn/a.png", "user_a_red_fox_1.png"),
                att("https://cdn/b.jpg", "user_a_red_fox_2.jpg"),
            ],
        );
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.is_upscale_variant));
    }

    #[test]
    fn test_non_image_attachments_dropped() {
        let events = artifact_events(
            "result",
            &[att("https://cdn/a.txt", "log_a_b.txt"), att("https://cdn/b.png", "u_p_1.png")],
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].raw_filename, "u_p_1.png");
    }

    #[test]
    fn test_no_attachments() {
        assert!(artifact_events("Waiting to start", &[]).is_empty());
    }
}
