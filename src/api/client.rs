/// HTTP client for the dashboard backend.
///
/// Synchronous `ureq` agent with a per-request timeout. Every call is
/// recorded in the event log with its latency and outcome (best-effort).
///
/// The session token travels in the `X-Session-Token` header, except on
/// `POST /trigger`, where the backend reads a `token` query parameter; see
/// [`BackendConfig::trigger_token_transport`].
use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{
    ActionResponse, Channel, ColorSuggestion, InviteResponse, MeResponse, PlanResponse, PlanStep,
    Role, SettingsMap, StatsResponse, SuggestResponse,
};
use super::{ApiError, Backend};
use crate::analytics::logger;
use crate::config::schema::{BackendConfig, StatsEndpoint, TokenTransport};

/// Header the backend reads the session token from.
pub const SESSION_HEADER: &str = "X-Session-Token";

/// How a single request authenticates.
#[derive(Debug, Clone, Copy)]
enum Auth<'a> {
    Anonymous,
    Header(&'a str),
    Query(&'a str),
}

impl<'a> Auth<'a> {
    fn with(transport: TokenTransport, token: &'a str) -> Self {
        match transport {
            TokenTransport::Header => Self::Header(token),
            TokenTransport::Query => Self::Query(token),
        }
    }
}

/// Blocking HTTP implementation of [`Backend`].
#[derive(Debug)]
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
    stats_endpoint: StatsEndpoint,
    trigger_transport: TokenTransport,
}

impl HttpBackend {
    /// Build a client from the resolved `[backend]` config.
    pub fn from_config(config: &BackendConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            stats_endpoint: config.stats_endpoint,
            trigger_transport: config.trigger_token_transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// OAuth entry point. Opened in a browser, never fetched.
    pub fn login_url(&self) -> String {
        format!("{}/login", self.base_url)
    }

    fn guild_path(guild_id: &str, resource: &str) -> String {
        format!("/api/guilds/{}/{resource}", urlencoding::encode(guild_id))
    }

    fn request(&self, method: &str, path: &str, auth: Auth<'_>) -> ureq::Request {
        let url = format!("{}{path}", self.base_url);
        let request = self.agent.request(method, &url);
        match auth {
            Auth::Anonymous => request,
            Auth::Header(token) => request.set(SESSION_HEADER, token),
            Auth::Query(token) => request.query("token", token),
        }
    }

    fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        guild_id: Option<&str>,
        path: &str,
        auth: Auth<'_>,
    ) -> Result<T, ApiError> {
        let request = self.request("GET", path, auth);
        self.send(operation, guild_id, request, None::<&()>)
    }

    fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        operation: &'static str,
        guild_id: Option<&str>,
        path: &str,
        auth: Auth<'_>,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request("POST", path, auth);
        self.send(operation, guild_id, request, Some(body))
    }

    /// Execute a request, classify the outcome, and log it.
    fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        operation: &'static str,
        guild_id: Option<&str>,
        request: ureq::Request,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let start = Instant::now();
        let response = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        let (status, result) = match response {
            Ok(resp) => {
                let status = resp.status();
                let parsed = resp
                    .into_json::<T>()
                    .map_err(|e| ApiError::Transport(format!("invalid response body: {e}")));
                (Some(status), parsed)
            }
            Err(ureq::Error::Status(401, _)) => (Some(401), Err(ApiError::Unauthorized)),
            Err(ureq::Error::Status(code, _)) => (Some(code), Err(ApiError::Http(code))),
            Err(ureq::Error::Transport(transport)) => {
                (None, Err(ApiError::Transport(transport.to_string())))
            }
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        logger::log_call(
            operation,
            guild_id,
            status,
            latency_ms,
            result.as_ref().err(),
        );

        result
    }
}

impl Backend for HttpBackend {
    fn me(&self, token: &str) -> Result<MeResponse, ApiError> {
        self.get("me", None, "/api/me", Auth::Header(token))
    }

    fn stats(&self, token: &str) -> Result<StatsResponse, ApiError> {
        match self.stats_endpoint {
            StatsEndpoint::Dashboard => {
                self.get("stats", None, "/api/dashboard/stats", Auth::Header(token))
            }
            StatsEndpoint::Public => self.get("stats", None, "/api/stats", Auth::Anonymous),
        }
    }

    fn guild_settings(&self, token: &str, guild_id: &str) -> Result<SettingsMap, ApiError> {
        let path = Self::guild_path(guild_id, "settings");
        self.get("settings.load", Some(guild_id), &path, Auth::Header(token))
    }

    fn save_guild_settings(
        &self,
        token: &str,
        guild_id: &str,
        settings: &SettingsMap,
    ) -> Result<ActionResponse, ApiError> {
        let path = Self::guild_path(guild_id, "settings");
        self.post(
            "settings.save",
            Some(guild_id),
            &path,
            Auth::Header(token),
            settings,
        )
    }

    fn roles(&self, token: &str, guild_id: &str) -> Result<Vec<Role>, ApiError> {
        let path = Self::guild_path(guild_id, "roles");
        self.get("roles", Some(guild_id), &path, Auth::Header(token))
    }

    fn channels(&self, token: &str, guild_id: &str) -> Result<Vec<Channel>, ApiError> {
        let path = Self::guild_path(guild_id, "channels");
        self.get("channels", Some(guild_id), &path, Auth::Header(token))
    }

    fn trigger(
        &self,
        token: &str,
        guild_id: &str,
        action: &str,
    ) -> Result<ActionResponse, ApiError> {
        let path = Self::guild_path(guild_id, "trigger");
        self.post(
            "trigger",
            Some(guild_id),
            &path,
            Auth::with(self.trigger_transport, token),
            &json!({ "action": action }),
        )
    }

    fn ai_plan(
        &self,
        token: &str,
        guild_id: &str,
        prompt: &str,
    ) -> Result<PlanResponse, ApiError> {
        let path = Self::guild_path(guild_id, "ai-plan");
        self.post(
            "ai.plan",
            Some(guild_id),
            &path,
            Auth::Header(token),
            &json!({ "prompt": prompt }),
        )
    }

    fn ai_execute(
        &self,
        token: &str,
        guild_id: &str,
        plan: &[PlanStep],
    ) -> Result<ActionResponse, ApiError> {
        let path = Self::guild_path(guild_id, "ai-execute");
        self.post(
            "ai.execute",
            Some(guild_id),
            &path,
            Auth::Header(token),
            &json!({ "plan": plan }),
        )
    }

    fn ai_suggest(&self, token: &str, guild_id: &str) -> Result<SuggestResponse, ApiError> {
        let path = Self::guild_path(guild_id, "ai-suggest");
        self.post(
            "ai.suggest",
            Some(guild_id),
            &path,
            Auth::Header(token),
            &json!({}),
        )
    }

    fn apply_suggestions(
        &self,
        token: &str,
        guild_id: &str,
        color_updates: &[ColorSuggestion],
    ) -> Result<ActionResponse, ApiError> {
        let path = Self::guild_path(guild_id, "apply-suggestions");
        self.post(
            "ai.apply",
            Some(guild_id),
            &path,
            Auth::Header(token),
            &json!({ "color_updates": color_updates }),
        )
    }

    fn invite_url(&self, guild_id: &str) -> Result<String, ApiError> {
        let request = self
            .request("GET", "/api/invite-url", Auth::Anonymous)
            .query("guild_id", guild_id);
        let invite: InviteResponse = self.send("invite", Some(guild_id), request, None::<&()>)?;
        Ok(invite.url)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
