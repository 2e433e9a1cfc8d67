//! Gateway session credentials and routing identifiers

/// Immutable routing identifiers for the `/imagine` interaction.
///
/// These name the remote application, the guild/channel the command is
/// issued in, and the registered command definition the payload must echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingIds {
    pub application_id: String,
    pub guild_id: String,
    pub channel_id: String,
    pub command_id: String,
    pub command_version: String,
}

/// Gateway connection credentials plus routing identifiers.
///
/// Created once at bridge startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct Session {
    /// User authorization token for interaction submission.
    pub auth_token: String,
    /// Tracking cookie sent alongside submissions.
    pub cookie: String,
    /// Client signature (User-Agent) the remote service expects.
    pub user_agent: String,
    /// Gateway session identifier echoed in every submission.
    pub session_id: String,
    pub routing: RoutingIds,
}
