//! Typed guild settings form.
//!
//! [`SettingsField`] enumerates every editable field with its wire key.
//! [`GuildSettings::from_server`] and [`GuildSettings::to_payload`] are the
//! only two conversions between the backend's flat object and the form.

pub mod suggest;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::api::types::SettingsMap;

/// Form section a field is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Core,
    Channels,
    Roles,
    Software,
    Advanced,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => write!(f, "CORE"),
            Self::Channels => write!(f, "CHANNELS"),
            Self::Roles => write!(f, "ROLES"),
            Self::Software => write!(f, "SOFTWARE"),
            Self::Advanced => write!(f, "ADVANCED"),
        }
    }
}

/// One editable guild setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingsField {
    Prefix,
    Vibe,
    WelcomeChannel,
    LogChannel,
    RulesChannel,
    RoleRequestChannel,
    VerificationChannel,
    LevelingChannel,
    GeneralChannel,
    VerifiedRole,
    UnverifiedRole,
    MutedRole,
    AeRole,
    AmRole,
    CapcutRole,
    PrRole,
    PsRole,
    AestheticOverlay,
    CustomSystemPrompt,
    RolesChannel,
}

impl SettingsField {
    /// Every field, in form order.
    pub const ALL: [SettingsField; 20] = [
        Self::Prefix,
        Self::Vibe,
        Self::WelcomeChannel,
        Self::LogChannel,
        Self::RulesChannel,
        Self::RoleRequestChannel,
        Self::VerificationChannel,
        Self::LevelingChannel,
        Self::GeneralChannel,
        Self::VerifiedRole,
        Self::UnverifiedRole,
        Self::MutedRole,
        Self::AeRole,
        Self::AmRole,
        Self::CapcutRole,
        Self::PrRole,
        Self::PsRole,
        Self::AestheticOverlay,
        Self::CustomSystemPrompt,
        Self::RolesChannel,
    ];

    /// Key in the backend's settings object.
    pub fn key(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Vibe => "vibe",
            Self::WelcomeChannel => "welcome_channel",
            Self::LogChannel => "log_channel",
            Self::RulesChannel => "rules_channel",
            Self::RoleRequestChannel => "role_request_channel",
            Self::VerificationChannel => "verification_channel",
            Self::LevelingChannel => "leveling_channel",
            Self::GeneralChannel => "general_channel",
            Self::VerifiedRole => "verified_role",
            Self::UnverifiedRole => "unverified_role",
            Self::MutedRole => "muted_role",
            Self::AeRole => "ae_role",
            Self::AmRole => "am_role",
            Self::CapcutRole => "capcut_role",
            Self::PrRole => "pr_role",
            Self::PsRole => "ps_role",
            Self::AestheticOverlay => "aesthetic_overlay",
            Self::CustomSystemPrompt => "custom_system_prompt",
            Self::RolesChannel => "roles_channel",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Prefix => "Command prefix",
            Self::Vibe => "Vibe",
            Self::WelcomeChannel => "Welcome channel",
            Self::LogChannel => "Log channel",
            Self::RulesChannel => "Rules channel",
            Self::RoleRequestChannel => "Role request channel",
            Self::VerificationChannel => "Verification channel",
            Self::LevelingChannel => "Leveling channel",
            Self::GeneralChannel => "General channel",
            Self::VerifiedRole => "Verified role",
            Self::UnverifiedRole => "Unverified role",
            Self::MutedRole => "Muted role",
            Self::AeRole => "After Effects role",
            Self::AmRole => "Alight Motion role",
            Self::CapcutRole => "CapCut role",
            Self::PrRole => "Premiere Pro role",
            Self::PsRole => "Photoshop role",
            Self::AestheticOverlay => "Aesthetic overlay",
            Self::CustomSystemPrompt => "Custom system prompt",
            Self::RolesChannel => "Roles channel",
        }
    }

    pub fn section(self) -> Section {
        match self {
            Self::Prefix | Self::Vibe => Section::Core,
            Self::WelcomeChannel
            | Self::LogChannel
            | Self::RulesChannel
            | Self::RoleRequestChannel
            | Self::VerificationChannel
            | Self::LevelingChannel
            | Self::GeneralChannel => Section::Channels,
            Self::VerifiedRole | Self::UnverifiedRole | Self::MutedRole => Section::Roles,
            Self::AeRole | Self::AmRole | Self::CapcutRole | Self::PrRole | Self::PsRole => {
                Section::Software
            }
            Self::AestheticOverlay | Self::CustomSystemPrompt | Self::RolesChannel => {
                Section::Advanced
            }
        }
    }

    /// Value the form shows when the backend omits the field.
    pub fn fallback(self) -> &'static str {
        match self {
            Self::Prefix => "!",
            Self::Vibe => "chill",
            _ => "",
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SettingsField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|field| field.key() == wanted)
            .ok_or_else(|| format!("unknown settings field '{s}'"))
    }
}

/// The settings form for one guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSettings {
    values: [String; 20],
}

impl Default for GuildSettings {
    /// An empty form with every fallback filled in.
    fn default() -> Self {
        Self {
            values: SettingsField::ALL.map(|field| field.fallback().to_string()),
        }
    }
}

impl GuildSettings {
    /// Model → form. Missing or falsy values (null, `""`, `0`, `false`) take
    /// the field's fallback.
    pub fn from_server(settings: &SettingsMap) -> Self {
        Self {
            values: SettingsField::ALL.map(|field| {
                settings
                    .get(field.key())
                    .and_then(display_value)
                    .unwrap_or_else(|| field.fallback().to_string())
            }),
        }
    }

    /// Form → model. Every field is sent, as a string.
    pub fn to_payload(&self) -> SettingsMap {
        SettingsField::ALL
            .into_iter()
            .map(|field| (field.key().to_string(), Value::String(self.get(field).to_string())))
            .collect()
    }

    pub fn get(&self, field: SettingsField) -> &str {
        &self.values[index_of(field)]
    }

    pub fn set(&mut self, field: SettingsField, value: impl Into<String>) {
        self.values[index_of(field)] = value.into();
    }

    /// `(field, value)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (SettingsField, &str)> {
        SettingsField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }

    /// Copy backend-proposed `key → id` mappings into the form. Unknown keys
    /// and falsy values are skipped. Returns how many fields were set.
    pub fn apply_mappings(&mut self, mappings: &SettingsMap) -> usize {
        let mut applied = 0;
        for (key, value) in mappings {
            let (Ok(field), Some(text)) = (key.parse::<SettingsField>(), display_value(value))
            else {
                continue;
            };
            self.set(field, text);
            applied += 1;
        }
        applied
    }

    /// Apply `key=value` assignments. Nothing changes if any key is unknown.
    pub fn apply_assignments<S: AsRef<str>>(&mut self, assignments: &[S]) -> Result<(), String> {
        let mut parsed = Vec::with_capacity(assignments.len());
        for raw in assignments {
            let raw = raw.as_ref();
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
            parsed.push((key.parse::<SettingsField>()?, value.to_string()));
        }
        for (field, value) in parsed {
            self.set(field, value);
        }
        Ok(())
    }
}

fn index_of(field: SettingsField) -> usize {
    field as usize
}

/// Render a JSON value as form text; `None` for JS-falsy values.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
