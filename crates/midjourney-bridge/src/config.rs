//! Configuration management for the generation bridge

#[path = "config_tests.rs"]
mod config_tests;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use midjourney_types::{
    RoutingIds, Session, IMAGINE_APPLICATION_ID, IMAGINE_COMMAND_ID, IMAGINE_COMMAND_VERSION,
};

use crate::errors::{BridgeError, Result};

/// Environment lookup seam so `from_env` is testable with an in-memory map.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub imagine: ImagineConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Gateway and submission credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token for the gateway listener connection.
    pub bot_token: String,
    /// User authorization token for interaction submission.
    pub auth_token: String,
    /// Tracking cookie sent with submissions.
    #[serde(default)]
    pub cookie: String,
    /// Client signature the remote service expects.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Routing identifiers for the `/imagine` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagineConfig {
    #[serde(default = "default_application_id")]
    pub application_id: String,
    /// Guild the command is issued in.
    #[serde(default)]
    pub guild_id: String,
    /// Channel the command is issued in and results arrive on.
    #[serde(default)]
    pub channel_id: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
    #[serde(default = "default_command_id")]
    pub command_id: String,
    #[serde(default = "default_command_version")]
    pub command_version: String,
}

impl Default for ImagineConfig {
    fn default() -> Self {
        Self {
            application_id: default_application_id(),
            guild_id: String::new(),
            channel_id: String::new(),
            session_id: default_session_id(),
            command_id: default_command_id(),
            command_version: default_command_version(),
        }
    }
}

/// Staging area location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Root under which the `input/` and `output/` areas live.
    #[serde(default = "default_staging_root")]
    pub root: PathBuf,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            root: default_staging_root(),
        }
    }
}

/// Upper bounds for every blocking wait in the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_startup_secs")]
    pub startup_secs: u64,
    #[serde(default = "default_generation_secs")]
    pub generation_secs: u64,
    #[serde(default = "default_reject_backoff_secs")]
    pub reject_backoff_secs: u64,
    #[serde(default = "default_download_secs")]
    pub download_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            startup_secs: default_startup_secs(),
            generation_secs: default_generation_secs(),
            reject_backoff_secs: default_reject_backoff_secs(),
            download_secs: default_download_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_secs)
    }

    pub fn reject_backoff(&self) -> Duration {
        Duration::from_secs(self.reject_backoff_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("failed to read config {path}: {e}")))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| BridgeError::Config(format!("failed to parse config {path}: {e}")))?;
        Ok(config)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(&SystemEnv)
    }

    /// Load configuration from an environment lookup.
    ///
    /// `DISCORD_BOT_TOKEN`, `DISCORD_AUTH_TOKEN`, `MIDJOURNEY_GUILD_ID` and
    /// `MIDJOURNEY_CHANNEL_ID` are required. The cookie comes from
    /// `DISCORD_COOKIE`, or from the file named by `DISCORD_COOKIE_FILE`.
    pub fn from_env_with(env: &impl ReadEnv) -> Result<Self> {
        let require = |key: &str| {
            env.var(key)
                .ok_or_else(|| BridgeError::Config(format!("{key} not set")))
        };

        let cookie = match env.var("DISCORD_COOKIE") {
            Some(cookie) => cookie,
            None => match env.var("DISCORD_COOKIE_FILE") {
                Some(path) => fs::read_to_string(&path)
                    .map_err(|e| {
                        BridgeError::Config(format!("failed to read cookie file {path}: {e}"))
                    })?
                    .trim()
                    .to_string(),
                None => String::new(),
            },
        };

        Ok(Config {
            discord: DiscordConfig {
                bot_token: require("DISCORD_BOT_TOKEN")?,
                auth_token: require("DISCORD_AUTH_TOKEN")?,
                cookie,
                user_agent: env.var("DISCORD_USER_AGENT").unwrap_or_else(default_user_agent),
            },
            imagine: ImagineConfig {
                application_id: env
                    .var("MIDJOURNEY_APPLICATION_ID")
                    .unwrap_or_else(default_application_id),
                guild_id: require("MIDJOURNEY_GUILD_ID")?,
                channel_id: require("MIDJOURNEY_CHANNEL_ID")?,
                session_id: env
                    .var("MIDJOURNEY_SESSION_ID")
                    .unwrap_or_else(default_session_id),
                command_id: env
                    .var("MIDJOURNEY_COMMAND_ID")
                    .unwrap_or_else(default_command_id),
                command_version: env
                    .var("MIDJOURNEY_COMMAND_VERSION")
                    .unwrap_or_else(default_command_version),
            },
            staging: StagingConfig {
                root: env
                    .var("STAGING_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_staging_root),
            },
            timeouts: TimeoutConfig::default(),
        })
    }

    /// Assemble the immutable gateway session.
    pub fn session(&self) -> Session {
        Session {
            auth_token: self.discord.auth_token.clone(),
            cookie: self.discord.cookie.clone(),
            user_agent: self.discord.user_agent.clone(),
            session_id: self.imagine.session_id.clone(),
            routing: RoutingIds {
                application_id: self.imagine.application_id.clone(),
                guild_id: self.imagine.guild_id.clone(),
                channel_id: self.imagine.channel_id.clone(),
                command_id: self.imagine.command_id.clone(),
                command_version: self.imagine.command_version.clone(),
            },
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_application_id() -> String {
    IMAGINE_APPLICATION_ID.to_string()
}

fn default_session_id() -> String {
    "f2819fa0c1917fe071fb885b21bb5255".to_string()
}

fn default_command_id() -> String {
    IMAGINE_COMMAND_ID.to_string()
}

fn default_command_version() -> String {
    IMAGINE_COMMAND_VERSION.to_string()
}

fn default_staging_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_startup_secs() -> u64 {
    60
}

fn default_generation_secs() -> u64 {
    300
}

fn default_reject_backoff_secs() -> u64 {
    10
}

fn default_download_secs() -> u64 {
    60
}
