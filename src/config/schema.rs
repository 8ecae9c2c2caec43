/// Configuration schema and defaults for primedash.
///
/// Defines the TOML-serializable configuration structure with the
/// `[backend]`, `[feedback]`, `[ui]` and `[logging]` sections.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level primedash configuration.
///
/// Maps directly to the `~/.primedash/config.toml` and `.primedash.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub backend: BackendConfig,
    pub feedback: FeedbackConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Which stats endpoint the stats panel reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsEndpoint {
    /// `GET /api/dashboard/stats`, authenticated with the session header.
    #[default]
    Dashboard,
    /// `GET /api/stats`, unauthenticated.
    Public,
}

impl std::fmt::Display for StatsEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "dashboard"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// How the session token travels on a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenTransport {
    /// `X-Session-Token` request header.
    #[default]
    Header,
    /// `?token=` query parameter.
    Query,
}

impl std::fmt::Display for TokenTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Dashboard backend base URL (no trailing slash needed).
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Stats endpoint flavour: `dashboard` or `public`.
    pub stats_endpoint: StatsEndpoint,
    /// Token transport for `POST /trigger`. The backend reads the `token`
    /// query parameter there, so `query` is the default.
    pub trigger_token_transport: TokenTransport,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 10_000,
            stats_endpoint: StatsEndpoint::default(),
            trigger_token_transport: TokenTransport::Query,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// [feedback]
// ---------------------------------------------------------------------------

/// Delays before a feedback button returns to idle (milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub trigger_reset_ms: u64,
    pub save_reset_ms: u64,
    pub plan_error_reset_ms: u64,
    pub execute_success_reset_ms: u64,
    pub execute_error_reset_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            trigger_reset_ms: 2000,
            save_reset_ms: 2000,
            plan_error_reset_ms: 3000,
            execute_success_reset_ms: 4000,
            execute_error_reset_ms: 3000,
        }
    }
}

// ---------------------------------------------------------------------------
// [ui]
// ---------------------------------------------------------------------------

/// Layout preset. Mirrors the two page layouts the dashboard shipped with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Console layout: placeholder avatar, back-to-top after 200px.
    #[default]
    Console,
    /// Classic layout: initial-letter avatar, back-to-top after 300px.
    Classic,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::Classic => write!(f, "classic"),
        }
    }
}

/// What to show when the user has no avatar hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvatarFallback {
    /// The chat platform's default avatar image.
    #[default]
    Placeholder,
    /// The first letter of the user name.
    Initial,
}

/// Terminal view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Layout preset. Applied after all layers are merged.
    pub layout: Layout,
    pub avatar_fallback: AvatarFallback,
    /// Scroll offset (px) above which the back-to-top control shows.
    pub back_to_top_threshold: u32,
    /// Show the decorative activity feed in `primedash live`.
    pub activity_feed: bool,
    /// `chrono` format string for the clock.
    pub clock_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            avatar_fallback: AvatarFallback::Placeholder,
            back_to_top_threshold: 200,
            activity_feed: true,
            clock_format: "%H:%M:%S".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Event log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append one JSONL event per backend call to `~/.primedash/events.jsonl`.
    pub enabled: bool,
    /// Echo debug lines (swallowed failures, stale responses) to stderr.
    pub debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout application
// ---------------------------------------------------------------------------

impl DashConfig {
    /// Apply the layout preset's overrides.
    pub fn apply_layout(&mut self) {
        match self.ui.layout {
            Layout::Console => {}
            Layout::Classic => {
                self.ui.avatar_fallback = AvatarFallback::Initial;
                self.ui.back_to_top_threshold = 300;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl DashConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `primedash config init`.
    pub fn default_toml() -> String {
        r#"# primedash Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (PRIMEDASH_*)
#   2. Project config (.primedash.toml in current directory)
#   3. User global config (~/.primedash/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://localhost:8000"
timeout_ms = 10000
stats_endpoint = "dashboard"          # dashboard | public
trigger_token_transport = "query"     # query | header

[feedback]
trigger_reset_ms = 2000
save_reset_ms = 2000
plan_error_reset_ms = 3000
execute_success_reset_ms = 4000
execute_error_reset_ms = 3000

[ui]
layout = "console"                    # console | classic (classic overrides the two below)
avatar_fallback = "placeholder"       # placeholder | initial
back_to_top_threshold = 200
activity_feed = true
clock_format = "%H:%M:%S"

[logging]
enabled = true                        # ~/.primedash/events.jsonl
debug = false
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
