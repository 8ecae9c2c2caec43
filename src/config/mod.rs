/// Configuration system for primedash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::DashConfig::default()`]
/// 2. **User global config**: `~/.primedash/config.toml`
/// 3. **Project local config**: `.primedash.toml` in the current working directory
/// 4. **Environment variables**: `PRIMEDASH_*` overrides (highest precedence)
///
/// After merging, the `ui.layout` preset is applied.
///
/// # Usage
///
/// ```rust,ignore
/// use primedash::config;
///
/// let cfg = config::load();
/// let backend = HttpBackend::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::DashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars → layout application.
pub fn load() -> DashConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_layer(path) {
            merge_toml(&mut merged, layer);
        }
    }

    let mut config: DashConfig = merged.try_into().unwrap_or_default();
    apply_env_overrides(&mut config);
    config.apply_layout();

    config
}

/// Load one TOML layer from the given path (if it exists).
///
/// Malformed files, and files that do not fit the schema, are ignored; the
/// dashboard must still come up.
fn load_toml_layer(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let layer: toml::Value = toml::from_str(&content).ok()?;
    layer.clone().try_into::<DashConfig>().ok()?;
    Some(layer)
}

/// Merge a layer into the base, key by key. Tables merge recursively;
/// anything else in the overlay replaces the base value.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.primedash/`, the home of config, session and logs.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".primedash"))
}

fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".primedash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `PRIMEDASH_URL`: backend base URL
/// - `PRIMEDASH_TIMEOUT_MS`: per-request timeout
/// - `PRIMEDASH_STATS_ENDPOINT`: `dashboard` or `public`
/// - `PRIMEDASH_TRIGGER_TRANSPORT`: `query` or `header`
/// - `PRIMEDASH_LAYOUT`: `console` or `classic`
/// - `PRIMEDASH_LOG`: event log on/off
/// - `PRIMEDASH_DEBUG`: debug lines on stderr
fn apply_env_overrides(config: &mut DashConfig) {
    if let Ok(val) = std::env::var("PRIMEDASH_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("PRIMEDASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("PRIMEDASH_STATS_ENDPOINT")
        && let Some(endpoint) = parse_stats_endpoint(&val)
    {
        config.backend.stats_endpoint = endpoint;
    }
    if let Ok(val) = std::env::var("PRIMEDASH_TRIGGER_TRANSPORT")
        && let Some(transport) = parse_transport(&val)
    {
        config.backend.trigger_token_transport = transport;
    }
    if let Ok(val) = std::env::var("PRIMEDASH_LAYOUT")
        && let Some(layout) = parse_layout(&val)
    {
        config.ui.layout = layout;
    }
    if let Ok(val) = std::env::var("PRIMEDASH_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PRIMEDASH_DEBUG") {
        config.logging.debug = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_stats_endpoint(val: &str) -> Option<schema::StatsEndpoint> {
    match val.to_ascii_lowercase().as_str() {
        "dashboard" => Some(schema::StatsEndpoint::Dashboard),
        "public" => Some(schema::StatsEndpoint::Public),
        _ => None,
    }
}

fn parse_transport(val: &str) -> Option<schema::TokenTransport> {
    match val.to_ascii_lowercase().as_str() {
        "header" => Some(schema::TokenTransport::Header),
        "query" => Some(schema::TokenTransport::Query),
        _ => None,
    }
}

fn parse_layout(val: &str) -> Option<schema::Layout> {
    match val.to_ascii_lowercase().as_str() {
        "console" => Some(schema::Layout::Console),
        "classic" => Some(schema::Layout::Classic),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.primedash/config.toml`.
///
/// Returns an error if the file already exists and `force` is false.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.primedash/ directory")?;
    }

    fs::write(&path, DashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `backend.base_url`. The existing file is laid
/// over the serialized defaults, so any schema key can be set.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root = toml::Value::try_from(DashConfig::default())
        .context("failed to serialize default config")?;
    if path.exists() {
        let source = fs::read_to_string(&path).context("failed to read config file")?;
        let existing: toml::Value =
            toml::from_str(&source).context("failed to parse config as TOML value")?;
        merge_toml(&mut root, existing);
    }
    set_toml_value(&mut root, key, value)?;

    // Reject values the schema can't hold before touching the file.
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<DashConfig>(&rendered)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, rendered).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("empty config key segment in '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => {
            if key == "ui.clock_format" && !crate::ui::clock::is_valid_format(raw_value) {
                anyhow::bail!("invalid strftime format '{raw_value}' for '{key}'");
            }
            toml::Value::String(raw_value.to_string())
        }
        Some(_) => anyhow::bail!("'{key}' is a section, not a value"),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
