//! Wire types for the dashboard backend.
//!
//! The backend is loose about number vs. string for snowflake ids and
//! permission bitmasks, so the deserializers here accept both.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Administrator permission bit.
pub const PERM_ADMINISTRATOR: u64 = 0x8;
/// Manage-guild permission bit.
pub const PERM_MANAGE_GUILD: u64 = 0x20;

const CDN: &str = "https://cdn.discordapp.com";

/// The chat platform's default avatar, used for users and guilds alike.
pub const DEFAULT_AVATAR_URL: &str = "https://cdn.discordapp.com/embed/avatars/0.png";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// `GET /api/me` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default, alias = "discord")]
    pub user: Option<User>,
    #[serde(default)]
    pub guilds: Vec<Guild>,
}

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "username")]
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// CDN URL of the user's avatar, if they have one.
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar
            .as_deref()
            .filter(|hash| !hash.is_empty())
            .map(|hash| format!("{CDN}/avatars/{}/{hash}.png", self.id))
    }

    /// Uppercase first letter of the name, `?` for an empty name.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

/// A community the user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "permission_bits")]
    pub permissions: u64,
    #[serde(default)]
    pub bot_present: bool,
}

impl Guild {
    /// Whether the user holds administrator or manage-guild here.
    pub fn is_manageable(&self) -> bool {
        is_manageable(self.permissions)
    }

    /// CDN URL of the guild icon, or the default placeholder.
    pub fn icon_url(&self) -> String {
        match self.icon.as_deref().filter(|hash| !hash.is_empty()) {
            Some(hash) => format!("{CDN}/icons/{}/{hash}.png", self.id),
            None => DEFAULT_AVATAR_URL.to_string(),
        }
    }
}

/// A guild is manageable iff the member holds bit 0x8 or 0x20.
pub fn is_manageable(permissions: u64) -> bool {
    permissions & PERM_ADMINISTRATOR != 0 || permissions & PERM_MANAGE_GUILD != 0
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// `GET /api/dashboard/stats` (or `/api/stats`) response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsResponse {
    #[serde(default, alias = "total_users")]
    pub users: u64,
    #[serde(default)]
    pub messages: u64,
    #[serde(default, alias = "system_status")]
    pub status: Option<String>,
    #[serde(default)]
    pub bot_servers: Option<u64>,
    #[serde(default)]
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub level: u64,
    #[serde(default)]
    pub xp: u64,
}

// ---------------------------------------------------------------------------
// Guild resources
// ---------------------------------------------------------------------------

/// A guild role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub managed: bool,
}

/// A guild channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
}

impl Channel {
    /// Text (0) and announcement (5) channels are the ones settings point at.
    pub fn is_text_like(&self) -> bool {
        matches!(self.kind, 0 | 5)
    }
}

/// Raw settings object as stored by the backend.
pub type SettingsMap = Map<String, Value>;

// ---------------------------------------------------------------------------
// Actions and the AI architect
// ---------------------------------------------------------------------------

/// Generic `{status, error?, message?, results?}` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<String>,
}

impl ActionResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// One proposed structural change.
///
/// Steps are passed back to `/ai-execute` as received: keys not modelled
/// here are kept in `extra`, and `color` keeps its original JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanStep {
    /// Action name without the `create_` prefix, as shown in the review.
    pub fn short_action(&self) -> &str {
        self.action.strip_prefix("create_").unwrap_or(&self.action)
    }

    /// Colour as `#rrggbb`. Strings are taken as-is; integers are read as
    /// a packed RGB value.
    pub fn color_hex(&self) -> Option<String> {
        match self.color.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => n
                .as_u64()
                .filter(|rgb| *rgb <= 0xFF_FFFF)
                .map(|rgb| format!("#{rgb:06x}")),
            _ => None,
        }
    }
}

/// `POST /ai-plan` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub plan: Vec<PlanStep>,
}

impl PlanResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// `POST /ai-suggest` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub suggestions: Option<AiSuggestions>,
}

impl SuggestResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Settings-key → id mappings proposed by the backend's auditor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiSuggestions {
    #[serde(default)]
    pub mappings: Map<String, Value>,
    #[serde(default)]
    pub role_color_suggestions: Vec<ColorSuggestion>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// A proposed role colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSuggestion {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub suggested_color: String,
}

/// `GET /api/invite-url` response.
#[derive(Debug, Clone, Deserialize)]
pub struct InviteResponse {
    pub url: String,
}

// ---------------------------------------------------------------------------
// Lenient deserializers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Unsigned(u64),
    Signed(i64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Unsigned(n) => n.to_string(),
        StringOrNumber::Signed(n) => n.to_string(),
    })
}

fn permission_bits<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        StringOrNumber::Unsigned(n) => Ok(n),
        StringOrNumber::Signed(n) => u64::try_from(n).map_err(serde::de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
