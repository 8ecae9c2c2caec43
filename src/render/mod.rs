//! Plain-text renderers for the dashboard panels.
//!
//! Everything here is pure: it takes view data and returns strings. The CLI
//! adds colour on top.

use crate::api::types::{
    AiSuggestions, Channel, DEFAULT_AVATAR_URL, Guild, LeaderboardEntry, PlanStep, Role,
    StatsResponse, User,
};
use crate::config::schema::AvatarFallback;
use crate::settings::{GuildSettings, Section};

/// Shown instead of guild cards when nothing is manageable.
pub const NO_GUILDS_PLACEHOLDER: &str = "No managed servers found.";

/// Plan step icon when the backend sends none.
pub const DEFAULT_PLAN_ICON: &str = "🛠️";

/// Accent colour for plan steps without their own.
pub const DEFAULT_ACCENT: &str = "#00ffaa";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// What stands in for the user's picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    Url(String),
    Initial(String),
}

impl std::fmt::Display for Avatar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Initial(letter) => write!(f, "[{letter}]"),
        }
    }
}

pub fn avatar(user: &User, fallback: AvatarFallback) -> Avatar {
    match (user.avatar_url(), fallback) {
        (Some(url), _) => Avatar::Url(url),
        (None, AvatarFallback::Placeholder) => Avatar::Url(DEFAULT_AVATAR_URL.to_string()),
        (None, AvatarFallback::Initial) => Avatar::Initial(user.initial()),
    }
}

/// Header line: name and avatar.
pub fn identity(user: &User, fallback: AvatarFallback) -> String {
    format!("{}  {}", user.name, avatar(user, fallback))
}

// ---------------------------------------------------------------------------
// Guild grid
// ---------------------------------------------------------------------------

/// One card in the server grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildCard {
    pub id: String,
    pub name: String,
    pub icon_url: String,
    pub tag: &'static str,
    pub bot_present: bool,
}

impl GuildCard {
    pub fn from_guild(guild: &Guild) -> Self {
        Self {
            id: guild.id.clone(),
            name: guild.name.clone(),
            icon_url: guild.icon_url(),
            tag: if guild.bot_present {
                "ACTIVE"
            } else {
                "INVITE REQUIRED"
            },
            bot_present: guild.bot_present,
        }
    }
}

/// Cards for the manageable subset of `guilds`, in order.
pub fn guild_cards(guilds: &[Guild]) -> Vec<GuildCard> {
    guilds
        .iter()
        .filter(|g| g.is_manageable())
        .map(GuildCard::from_guild)
        .collect()
}

/// The grid as lines: one per card, or only the placeholder.
pub fn guild_grid(guilds: &[Guild]) -> Vec<String> {
    let cards = guild_cards(guilds);
    if cards.is_empty() {
        return vec![NO_GUILDS_PLACEHOLDER.to_string()];
    }
    cards
        .iter()
        .map(|card| format!("{:<32} {:<20} {:>16}", truncate(&card.name, 32), card.id, card.tag))
        .collect()
}

// ---------------------------------------------------------------------------
// Stats and leaderboard
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Thousands with one decimal and a `K` suffix, rounded half up
/// (`1234` → `1.2K`, `1250` → `1.3K`).
pub fn format_thousands(n: u64) -> String {
    let tenths = n / 100 + u64::from(n % 100 >= 50);
    format!("{}.{}K", tenths / 10, tenths % 10)
}

/// Counter lines for the stats panel.
pub fn stats_panel(stats: &StatsResponse) -> Vec<String> {
    let mut lines = vec![
        format!("Users     {}", format_number(stats.users)),
        format!("Messages  {}", format_thousands(stats.messages)),
    ];
    if let Some(status) = &stats.status {
        lines.push(format!("Status    {status}"));
    }
    if let Some(servers) = stats.bot_servers {
        lines.push(format!("Servers   {}", format_number(servers)));
    }
    lines
}

/// Last four characters of an id (all of it when shorter).
pub fn short_id(id: &str) -> &str {
    let skip = id.chars().count().saturating_sub(4);
    id.char_indices().nth(skip).map_or(id, |(i, _)| &id[i..])
}

pub fn leaderboard_row(rank: usize, entry: &LeaderboardEntry) -> String {
    format!(
        "#{:<3} ID: {:<6} LVL {:<4} {} XP",
        rank,
        short_id(&entry.id),
        entry.level,
        format_number(entry.xp)
    )
}

/// Leaderboard rows, or `None` when the backend sent no leaderboard.
pub fn leaderboard(stats: &StatsResponse) -> Option<Vec<String>> {
    let entries = stats.leaderboard.as_ref()?;
    Some(
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| leaderboard_row(i + 1, entry))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Settings, roles, channels
// ---------------------------------------------------------------------------

/// The form grouped by section, with a header line per section.
pub fn settings_form(form: &GuildSettings) -> Vec<String> {
    let mut lines = Vec::new();
    let mut section: Option<Section> = None;
    for (field, value) in form.iter() {
        if section != Some(field.section()) {
            section = Some(field.section());
            lines.push(format!("[{}]", field.section()));
        }
        let shown = if value.is_empty() { "-" } else { value };
        lines.push(format!(
            "  {:<22} {:<24} {}",
            field.key(),
            truncate(shown, 24),
            field.label()
        ));
    }
    lines
}

pub fn role_lines(roles: &[Role]) -> Vec<String> {
    roles
        .iter()
        .map(|role| {
            let managed = if role.managed { " (managed)" } else { "" };
            format!("{:<20} #{:06x}  {}{managed}", role.id, role.color, role.name)
        })
        .collect()
}

pub fn channel_lines(channels: &[Channel]) -> Vec<String> {
    channels
        .iter()
        .map(|channel| format!("{:<20} #{}", channel.id, channel.name))
        .collect()
}

// ---------------------------------------------------------------------------
// AI architect
// ---------------------------------------------------------------------------

/// One row of the plan review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLine {
    pub icon: String,
    pub action: String,
    pub color: String,
    pub target: String,
}

impl PlanLine {
    pub fn from_step(step: &PlanStep) -> Self {
        let target = match &step.kind {
            Some(kind) if !kind.is_empty() => format!("{} ({kind})", step.name),
            _ => step.name.clone(),
        };
        Self {
            icon: non_empty(step.icon.as_deref()).unwrap_or(DEFAULT_PLAN_ICON).to_string(),
            action: step.short_action().to_string(),
            color: step
                .color_hex()
                .unwrap_or_else(|| DEFAULT_ACCENT.to_string()),
            target,
        }
    }
}

impl std::fmt::Display for PlanLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}  {}", self.icon, self.action, self.target)
    }
}

pub fn plan_review(plan: &[PlanStep]) -> Vec<PlanLine> {
    plan.iter().map(PlanLine::from_step).collect()
}

/// Mapping, colour and reasoning lines for an AI suggestion.
pub fn suggestion_lines(suggestions: &AiSuggestions) -> Vec<String> {
    let mut lines: Vec<String> = suggestions
        .mappings
        .iter()
        .map(|(key, value)| {
            let id = value.as_str().map_or_else(|| value.to_string(), str::to_string);
            format!("{key:<22} → {id}")
        })
        .collect();
    lines.extend(
        suggestions
            .role_color_suggestions
            .iter()
            .map(|c| format!("role {:<17} → {}", c.id, c.suggested_color)),
    );
    if let Some(reasoning) = non_empty(suggestions.reasoning.as_deref()) {
        lines.push(format!("Reasoning: {reasoning}"));
    }
    lines
}

/// Parse `#rrggbb` (or `rrggbb`) into RGB.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
