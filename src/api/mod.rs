//! Dashboard backend API.
//!
//! [`Backend`] is the seam between the client state machine and the HTTP
//! transport. [`client::HttpBackend`] is the real implementation; tests
//! script their own.

pub mod client;
pub mod types;

use thiserror::Error;

use types::{
    ActionResponse, Channel, ColorSuggestion, MeResponse, PlanResponse, PlanStep, Role,
    SettingsMap, StatsResponse, SuggestResponse,
};

/// Failure taxonomy for a backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network failure or an unreadable response body.
    #[error("transport error: {0}")]
    Transport(String),
    /// HTTP 401, or an explicit `authenticated: false`.
    #[error("Unauthorized: Please log in again.")]
    Unauthorized,
    /// Any other non-2xx status.
    #[error("HTTP Error: {0}")]
    Http(u16),
    /// The backend answered but reported `status != "success"`.
    #[error("{0}")]
    Application(String),
}

impl ApiError {
    /// Whether the call never produced a usable response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// The calls the dashboard makes against its backend.
///
/// Every guild-scoped call takes the session token explicitly; the client
/// state owns it, not the transport.
pub trait Backend {
    fn me(&self, token: &str) -> Result<MeResponse, ApiError>;
    fn stats(&self, token: &str) -> Result<StatsResponse, ApiError>;
    fn guild_settings(&self, token: &str, guild_id: &str) -> Result<SettingsMap, ApiError>;
    fn save_guild_settings(
        &self,
        token: &str,
        guild_id: &str,
        settings: &SettingsMap,
    ) -> Result<ActionResponse, ApiError>;
    fn roles(&self, token: &str, guild_id: &str) -> Result<Vec<Role>, ApiError>;
    fn channels(&self, token: &str, guild_id: &str) -> Result<Vec<Channel>, ApiError>;
    fn trigger(&self, token: &str, guild_id: &str, action: &str)
    -> Result<ActionResponse, ApiError>;
    fn ai_plan(&self, token: &str, guild_id: &str, prompt: &str)
    -> Result<PlanResponse, ApiError>;
    fn ai_execute(
        &self,
        token: &str,
        guild_id: &str,
        plan: &[PlanStep],
    ) -> Result<ActionResponse, ApiError>;
    fn ai_suggest(&self, token: &str, guild_id: &str) -> Result<SuggestResponse, ApiError>;
    fn apply_suggestions(
        &self,
        token: &str,
        guild_id: &str,
        color_updates: &[ColorSuggestion],
    ) -> Result<ActionResponse, ApiError>;
    fn invite_url(&self, guild_id: &str) -> Result<String, ApiError>;
}
