//! The `/imagine` interaction payload sent to the remote service
//!
//! The payload must match the schema the remote service registered for the
//! command, down to the localization fields. `ImagineInteraction` is the
//! typed form of that schema; the builder validates required fields before
//! anything is serialized so a malformed submission can never leave the
//! process.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::session::Session;

/// Application that owns the `/imagine` command.
pub const IMAGINE_APPLICATION_ID: &str = "936929561302675456";
/// Registered command identifier.
pub const IMAGINE_COMMAND_ID: &str = "938956540159881230";
/// Registered command version.
pub const IMAGINE_COMMAND_VERSION: &str = "1237876415471554623";
pub const IMAGINE_COMMAND_NAME: &str = "imagine";
pub const IMAGINE_COMMAND_DESCRIPTION: &str = "Create images with Midjourney";
/// UI-origin tag the remote service expects on slash submissions.
pub const ANALYTICS_LOCATION_SLASH_UI: &str = "slash_ui";

const NONCE_PREFIX: &str = "1238891";
const NONCE_RANDOM_DIGITS: usize = 12;

/// Interaction type 2 — application command.
const INTERACTION_APPLICATION_COMMAND: u8 = 2;
/// Command / option type 1 — chat input subcommand level.
const COMMAND_TYPE_CHAT_INPUT: u8 = 1;
/// Option type 3 — string option.
const OPTION_TYPE_STRING: u8 = 3;

/// Errors from [`ImagineInteractionBuilder::build`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandBuildError {
    #[error("prompt must not be empty")]
    EmptyPrompt,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Generate a fresh correlation nonce: fixed prefix plus 12 random digits.
///
/// The remote service does not reliably echo the nonce back, so it is only
/// a best-effort correlation token; real correlation relies on the strict
/// single-in-flight request discipline.
pub fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    let digits: String = (0..NONCE_RANDOM_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    format!("{NONCE_PREFIX}{digits}")
}

/// Tunable generation parameters with the remote service's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    pub style: u32,
    pub weird: u32,
    pub chaos: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            style: 100,
            weird: 0,
            chaos: 0,
        }
    }
}

/// One generation request: prompt, parameters, and a fresh nonce.
///
/// Created per `imagine` call and discarded after completion or timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: u32,
    pub weirdness: u32,
    pub chaos: u32,
    pub nonce: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, options: GenerationOptions) -> Self {
        Self {
            prompt: prompt.into(),
            style: options.style,
            weirdness: options.weird,
            chaos: options.chaos,
            nonce: generate_nonce(),
        }
    }

    /// The prompt option value in the wire format the command expects.
    pub fn option_value(&self) -> String {
        format!(
            "{} --s {} --w {} --c {}",
            self.prompt, self.style, self.weirdness, self.chaos
        )
    }
}

/// A submitted option value (`{"type": 3, "name": "prompt", "value": ...}`).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OptionValue {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub value: String,
}

/// Declared option schema mirroring the command's registered definition.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OptionSpec {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    pub required: bool,
    pub description_localized: String,
    pub name_localized: String,
}

/// The registered application command definition echoed in the submission.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApplicationCommand {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub application_id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub options: Vec<OptionSpec>,
    pub dm_permission: bool,
    pub contexts: Vec<u8>,
    pub integration_types: Vec<u8>,
    pub global_popularity_rank: u32,
    pub description_localized: String,
    pub name_localized: String,
}

/// The `data` block of the interaction submission.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InteractionData {
    pub version: String,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub options: Vec<OptionValue>,
    pub application_command: ApplicationCommand,
    pub attachments: Vec<serde_json::Value>,
}

/// Complete `/imagine` interaction submission payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImagineInteraction {
    #[serde(rename = "type")]
    pub kind: u8,
    pub application_id: String,
    pub guild_id: String,
    pub channel_id: String,
    pub session_id: String,
    pub data: InteractionData,
    pub nonce: String,
    pub analytics_location: String,
}

impl ImagineInteraction {
    pub fn builder(session: &Session) -> ImagineInteractionBuilder {
        ImagineInteractionBuilder {
            session: session.clone(),
            request: None,
        }
    }
}

/// Validating builder for [`ImagineInteraction`].
#[derive(Debug, Clone)]
pub struct ImagineInteractionBuilder {
    session: Session,
    request: Option<GenerationRequest>,
}

impl ImagineInteractionBuilder {
    pub fn request(mut self, request: GenerationRequest) -> Self {
        self.request = Some(request);
        self
    }

    /// Validate required fields and assemble the payload.
    pub fn build(self) -> Result<ImagineInteraction, CommandBuildError> {
        let request = self
            .request
            .ok_or(CommandBuildError::MissingField("request"))?;
        if request.prompt.trim().is_empty() {
            return Err(CommandBuildError::EmptyPrompt);
        }

        let routing = &self.session.routing;
        for (name, value) in [
            ("application_id", &routing.application_id),
            ("guild_id", &routing.guild_id),
            ("channel_id", &routing.channel_id),
            ("command_id", &routing.command_id),
            ("command_version", &routing.command_version),
            ("session_id", &self.session.session_id),
        ] {
            if value.is_empty() {
                return Err(CommandBuildError::MissingField(name));
            }
        }

        let option_spec = OptionSpec {
            kind: OPTION_TYPE_STRING,
            name: "prompt".to_string(),
            description: "The prompt to imagine".to_string(),
            required: true,
            description_localized: "The prompt to imagine".to_string(),
            name_localized: "prompt".to_string(),
        };

        let application_command = ApplicationCommand {
            id: routing.command_id.clone(),
            kind: COMMAND_TYPE_CHAT_INPUT,
            application_id: routing.application_id.clone(),
            version: routing.command_version.clone(),
            name: IMAGINE_COMMAND_NAME.to_string(),
            description: IMAGINE_COMMAND_DESCRIPTION.to_string(),
            options: vec![option_spec],
            dm_permission: true,
            contexts: vec![0, 1, 2],
            integration_types: vec![0, 1],
            global_popularity_rank: 1,
            description_localized: IMAGINE_COMMAND_DESCRIPTION.to_string(),
            name_localized: IMAGINE_COMMAND_NAME.to_string(),
        };

        let data = InteractionData {
            version: routing.command_version.clone(),
            id: routing.command_id.clone(),
            name: IMAGINE_COMMAND_NAME.to_string(),
            kind: COMMAND_TYPE_CHAT_INPUT,
            options: vec![OptionValue {
                kind: OPTION_TYPE_STRING,
                name: "prompt".to_string(),
                value: request.option_value(),
            }],
            application_command,
            attachments: Vec::new(),
        };

        Ok(ImagineInteraction {
            kind: INTERACTION_APPLICATION_COMMAND,
            application_id: routing.application_id.clone(),
            guild_id: routing.guild_id.clone(),
            channel_id: routing.channel_id.clone(),
            session_id: self.session.session_id.clone(),
            data,
            nonce: request.nonce,
            analytics_location: ANALYTICS_LOCATION_SLASH_UI.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RoutingIds;
    use serde_json::json;

    fn test_session() -> Session {
        Session {
            auth_token: "user-token".to_string(),
            cookie: "cookie=1".to_string(),
            user_agent: "agent/1.0".to_string(),
            session_id: "sess-abc".to_string(),
            routing: RoutingIds {
                application_id: IMAGINE_APPLICATION_ID.to_string(),
                guild_id: "1111".to_string(),
                channel_id: "2222".to_string(),
                command_id: IMAGINE_COMMAND_ID.to_string(),
                command_version: IMAGINE_COMMAND_VERSION.to_string(),
            },
        }
    }

    #[test]
    fn test_nonce_format() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), NONCE_PREFIX.len() + NONCE_RANDOM_DIGITS);
        assert!(nonce.starts_with(NONCE_PREFIX));
        assert!(nonce.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_option_value_format() {
        let req = GenerationRequest::new(
            "a red fox",
            GenerationOptions {
                style: 250,
                weird: 5,
                chaos: 7,
            },
        );
        assert_eq!(req.option_value(), "a red fox --s 250 --w 5 --c 7");
    }

    #[test]
    fn test_default_options() {
        let req = GenerationRequest::new("castle", GenerationOptions::default());
        assert_eq!(req.option_value(), "castle --s 100 --w 0 --c 0");
    }

    #[test]
    fn test_build_full_payload_shape() {
        let mut req = GenerationRequest::new("a red fox", GenerationOptions::default());
        req.nonce = "1238891000000000000".to_string();

        let payload = ImagineInteraction::builder(&test_session())
            .request(req)
            .build()
            .unwrap();

        let expected = json!({
            "type": 2,
            "application_id": IMAGINE_APPLICATION_ID,
            "guild_id": "1111",
            "channel_id": "2222",
            "session_id": "sess-abc",
            "data": {
                "version": IMAGINE_COMMAND_VERSION,
                "id": IMAGINE_COMMAND_ID,
                "name": "imagine",
                "type": 1,
                "options": [
                    {
                        "type": 3,
                        "name": "prompt",
                        "value": "a red fox --s 100 --w 0 --c 0"
                    }
                ],
                "application_command": {
                    "id": IMAGINE_COMMAND_ID,
                    "type": 1,
                    "application_id": IMAGINE_APPLICATION_ID,
                    "version": IMAGINE_COMMAND_VERSION,
                    "name": "imagine",
                    "description": "Create images with Midjourney",
                    "options": [
                        {
                            "type": 3,
                            "name": "prompt",
                            "description": "The prompt to imagine",
                            "required": true,
                            "description_localized": "The prompt to imagine",
                            "name_localized": "prompt"
                        }
                    ],
                    "dm_permission": true,
                    "contexts": [0, 1, 2],
                    "integration_types": [0, 1],
                    "global_popularity_rank": 1,
                    "description_localized": "Create images with Midjourney",
                    "name_localized": "imagine"
                },
                "attachments": []
            },
            "nonce": "1238891000000000000",
            "analytics_location": "slash_ui"
        });

        assert_eq!(serde_json::to_value(&payload).unwrap(), expected);
    }

    #[test]
    fn test_build_rejects_empty_prompt() {
        let req = GenerationRequest::new("   ", GenerationOptions::default());
        let err = ImagineInteraction::builder(&test_session())
            .request(req)
            .build()
            .unwrap_err();
        assert_eq!(err, CommandBuildError::EmptyPrompt);
    }

    #[test]
    fn test_build_rejects_missing_request() {
        let err = ImagineInteraction::builder(&test_session())
            .build()
            .unwrap_err();
        assert_eq!(err, CommandBuildError::MissingField("request"));
    }

    #[test]
    fn test_build_rejects_missing_routing_field() {
        let mut session = test_session();
        session.routing.channel_id.clear();
        let req = GenerationRequest::new("a red fox", GenerationOptions::default());
        let err = ImagineInteraction::builder(&session)
            .request(req)
            .build()
            .unwrap_err();
        assert_eq!(err, CommandBuildError::MissingField("channel_id"));
    }
}
