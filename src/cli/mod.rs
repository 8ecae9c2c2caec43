//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `primedash login|logout|status`: session management
//! - `primedash stats|guilds`: overview panels
//! - `primedash open|settings|roles|channels`: per-guild configuration
//! - `primedash suggest-roles|ai-suggest|trigger|architect|invite`: actions
//! - `primedash live`: self-refreshing overview (see [`live`])
//! - `primedash history`: per-operation summary of the event log
//! - `primedash config show|init|set|reset`: configuration management
//!
//! Backend failures that the dashboard swallows still exit 0; only local
//! errors (bad arguments, unreadable files) surface as `Err`.

pub mod live;

use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::logger;
use crate::analytics::reporter::{self, History};
use crate::api::client::HttpBackend;
use crate::config::{self, DashConfig};
use crate::dashboard::{ButtonId, CardAction, Dashboard};
use crate::feedback::{FeedbackButton, FeedbackState};
use crate::render;
use crate::session::{self, SessionStore};
use crate::settings::SettingsField;
use crate::utils::browser::open_browser;

/// Output format for `primedash history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn new_dashboard(config: &DashConfig) -> Result<Dashboard<HttpBackend>> {
    let store = SessionStore::open_default()?;
    Ok(Dashboard::new(
        HttpBackend::from_config(&config.backend),
        store,
        config.feedback.clone(),
    ))
}

/// Dashboard booted with the stored session.
fn connect(config: &DashConfig) -> Result<Dashboard<HttpBackend>> {
    let store = SessionStore::open_default()?;
    let boot = session::bootstrap(None, &store)?;
    let mut dash = new_dashboard(config)?;
    dash.boot(boot.token);
    Ok(dash)
}

/// Booted dashboard, or `None` after telling the user to log in.
fn connect_authenticated(config: &DashConfig) -> Result<Option<Dashboard<HttpBackend>>> {
    let dash = connect(config)?;
    if dash.is_authenticated() {
        Ok(Some(dash))
    } else {
        print_logged_out();
        Ok(None)
    }
}

/// Booted dashboard with `guild` selected (settings not fetched).
fn connect_to_guild(config: &DashConfig, guild: &str) -> Result<Option<Dashboard<HttpBackend>>> {
    let Some(mut dash) = connect_authenticated(config)? else {
        return Ok(None);
    };
    if dash.select_guild(guild) {
        Ok(Some(dash))
    } else {
        print_unknown_guild(guild);
        Ok(None)
    }
}

/// Booted dashboard with `guild`'s configuration open.
fn open_guild(config: &DashConfig, guild: &str) -> Result<Option<Dashboard<HttpBackend>>> {
    let Some(mut dash) = connect_authenticated(config)? else {
        return Ok(None);
    };
    let Some(id) = dash.find_guild(guild).map(|g| g.id.clone()) else {
        print_unknown_guild(guild);
        return Ok(None);
    };
    if !dash.open_config(&id) {
        println!(
            "{}",
            "Could not load this server's settings. Try again in a moment.".yellow()
        );
        return Ok(None);
    }
    Ok(Some(dash))
}

fn print_logged_out() {
    println!("{}", "Not signed in.".yellow());
    println!(
        "  {}",
        "Run `primedash login` to start a session.".dimmed()
    );
}

fn print_unknown_guild(guild: &str) {
    println!(
        "{} No manageable server matches '{}'. Run `primedash guilds` to list them.",
        "✗".red().bold(),
        guild
    );
}

fn print_alerts(dash: &mut Dashboard<HttpBackend>) {
    for alert in dash.take_alerts() {
        println!("{} {}", "!".yellow().bold(), alert.bold());
    }
}

fn print_button(button: &FeedbackButton) {
    let label = match button.state() {
        FeedbackState::Success => button.label().green().bold(),
        FeedbackState::Error => button.label().red().bold(),
        FeedbackState::Pending => button.label().yellow(),
        FeedbackState::Idle => button.label().normal(),
    };
    println!("  [{label}]");
}

fn print_section(title: &str) {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(50));
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

// ---------------------------------------------------------------------------
// primedash login | logout | status
// ---------------------------------------------------------------------------

/// Start a session from a login-redirect URL or a bare token.
///
/// Without `redirect`, prints the backend's login URL (optionally opening
/// it) and reads the redirect URL from stdin.
pub fn run_login(config: &DashConfig, redirect: Option<&str>, open: bool) -> Result<()> {
    let input = match redirect {
        Some(input) => input.to_string(),
        None => {
            let login_url = HttpBackend::from_config(&config.backend).login_url();
            println!("{} {}", "Sign in at:".bold(), login_url.underline());
            if open && let Err(e) = open_browser(&login_url) {
                println!("  {}", format!("{e:#}").dimmed());
            }
            prompt_line("Paste the URL you were redirected to (or the session token): ")?
        }
    };

    let store = SessionStore::open_default()?;
    let boot = session::bootstrap(Some(&input), &store)?;
    if let Some(cleaned) = &boot.cleaned_url {
        println!("  {} {}", "Redirect:".dimmed(), cleaned.dimmed());
    }

    let mut dash = new_dashboard(config)?;
    if dash.boot(boot.token) {
        let user = dash.user().map(|u| u.name.clone()).unwrap_or_default();
        println!("{} Signed in as {}", "✓".green().bold(), user.bold());
        println!(
            "  {} manageable servers",
            dash.manageable_guilds().len()
        );
    } else {
        println!(
            "{} Login failed: no valid session token found.",
            "✗".red().bold()
        );
    }
    Ok(())
}

/// Drop the stored session.
pub fn run_logout(config: &DashConfig) -> Result<()> {
    let mut dash = new_dashboard(config)?;
    dash.logout();
    println!("{} Signed out", "✓".green().bold());
    Ok(())
}

/// Show session, backend and config status.
pub fn run_status(config: &DashConfig) -> Result<()> {
    print_section("primedash Status");

    let dash = connect(config)?;
    print_status_item("Backend", true, dash.backend().base_url());
    match dash.user() {
        Some(user) if dash.is_authenticated() => {
            print_status_item(
                "Session",
                true,
                &render::identity(user, config.ui.avatar_fallback),
            );
            print_status_item(
                "Servers",
                true,
                &format!(
                    "{} joined, {} manageable",
                    dash.guilds().len(),
                    dash.manageable_guilds().len()
                ),
            );
        }
        _ => print_status_item("Session", false, "not signed in (run `primedash login`)"),
    }

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_status_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.primedash/config.toml found"
        } else {
            "not found (run `primedash config init` to create)"
        },
    );
    print_status_item(
        "Layout",
        true,
        &format!(
            "{} / stats: {} / trigger auth: {}",
            config.ui.layout, config.backend.stats_endpoint, config.backend.trigger_token_transport
        ),
    );

    let log_exists = logger::events_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_status_item(
        "Event log",
        log_exists,
        &if log_exists {
            format!("{} entries", logger::read_all_entries().len())
        } else if config.logging.enabled {
            "no log file yet".to_string()
        } else {
            "disabled".to_string()
        },
    );

    Ok(())
}

fn print_status_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<15} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// primedash stats | guilds
// ---------------------------------------------------------------------------

/// Print counters and the leaderboard.
pub fn run_stats(config: &DashConfig) -> Result<()> {
    let Some(dash) = connect_authenticated(config)? else {
        return Ok(());
    };
    let Some(stats) = dash.stats() else {
        println!("{}", "Stats are unavailable right now.".yellow());
        return Ok(());
    };

    print_section("System Stats");
    for line in render::stats_panel(stats) {
        println!("  {line}");
    }

    if let Some(rows) = render::leaderboard(stats) {
        println!();
        println!("{}", "Leaderboard".bold().cyan());
        for (i, row) in rows.iter().enumerate() {
            if i % 2 == 0 {
                println!("  {row}");
            } else {
                println!("  {}", row.dimmed());
            }
        }
    }
    Ok(())
}

/// Print the identity header and the manageable server grid.
pub fn run_guilds(config: &DashConfig) -> Result<()> {
    let Some(dash) = connect_authenticated(config)? else {
        return Ok(());
    };
    if let Some(user) = dash.user() {
        println!(
            "{} {}",
            "Welcome back,".dimmed(),
            render::identity(user, config.ui.avatar_fallback).bold()
        );
        println!();
    }

    print_section("Managed Servers");
    let cards = render::guild_cards(dash.guilds());
    if cards.is_empty() {
        println!("  {}", render::NO_GUILDS_PLACEHOLDER.dimmed());
        return Ok(());
    }
    for (card, line) in cards.iter().zip(render::guild_grid(dash.guilds())) {
        if card.bot_present {
            println!("  {}", line.green());
        } else {
            println!("  {}", line.yellow());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// primedash open | settings | roles | channels
// ---------------------------------------------------------------------------

/// Act on a server card: show its configuration, or open the invite.
pub fn run_open(config: &DashConfig, guild: &str) -> Result<()> {
    let Some(mut dash) = connect_authenticated(config)? else {
        return Ok(());
    };
    let Some(id) = dash.find_guild(guild).map(|g| g.id.clone()) else {
        print_unknown_guild(guild);
        return Ok(());
    };

    match dash.select_card(&id) {
        Some(CardAction::OpenConfig { loaded: true }) => print_config(&dash),
        Some(CardAction::OpenConfig { loaded: false }) => println!(
            "{}",
            "Could not load this server's settings. Try again in a moment.".yellow()
        ),
        Some(CardAction::Invite(url)) => print_invite(&url, true),
        None => println!("{}", "Could not fetch an invite link.".yellow()),
    }
    Ok(())
}

fn print_config(dash: &Dashboard<HttpBackend>) {
    let Some(guild) = dash.active_guild() else {
        return;
    };
    print_section(&guild.name.to_uppercase());
    if let Some(form) = dash.form() {
        for line in render::settings_form(form) {
            if line.starts_with('[') {
                println!("{}", line.bold());
            } else {
                println!("{line}");
            }
        }
    }
    println!();
    println!(
        "  {}",
        format!("{} roles cached", dash.roles().len()).dimmed()
    );
}

/// Show the settings form for a server.
pub fn run_settings_show(config: &DashConfig, guild: &str) -> Result<()> {
    if let Some(dash) = open_guild(config, guild)? {
        print_config(&dash);
    }
    Ok(())
}

/// Edit named fields and save the whole form.
pub fn run_settings_set(config: &DashConfig, guild: &str, assignments: &[String]) -> Result<()> {
    for raw in assignments {
        let (key, _) = raw
            .split_once('=')
            .with_context(|| format!("expected key=value, got '{raw}'"))?;
        key.parse::<SettingsField>()
            .map_err(anyhow::Error::msg)
            .with_context(|| {
                format!(
                    "valid keys: {}",
                    SettingsField::ALL.map(SettingsField::key).join(", ")
                )
            })?;
    }

    let Some(mut dash) = open_guild(config, guild)? else {
        return Ok(());
    };
    if let Some(form) = dash.form_mut() {
        form.apply_assignments(assignments)
            .map_err(anyhow::Error::msg)?;
    }

    dash.save_active_settings(Instant::now());
    if let Some(button) = dash.button(&ButtonId::Save) {
        print_button(button);
    }
    Ok(())
}

/// List a server's roles.
pub fn run_roles(config: &DashConfig, guild: &str) -> Result<()> {
    let Some(mut dash) = connect_to_guild(config, guild)? else {
        return Ok(());
    };
    if !dash.fetch_roles() {
        println!("{}", "Roles are unavailable right now.".yellow());
        return Ok(());
    }
    print_section("Roles");
    for line in render::role_lines(dash.roles()) {
        println!("  {line}");
    }
    Ok(())
}

/// List a server's text and announcement channels.
pub fn run_channels(config: &DashConfig, guild: &str) -> Result<()> {
    let Some(mut dash) = connect_to_guild(config, guild)? else {
        return Ok(());
    };
    if !dash.fetch_channels() {
        println!("{}", "Channels are unavailable right now.".yellow());
        return Ok(());
    }
    print_section("Channels");
    for line in render::channel_lines(dash.channels()) {
        println!("  {line}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// primedash suggest-roles | ai-suggest
// ---------------------------------------------------------------------------

/// Map software roles by name, optionally saving the result.
pub fn run_suggest_roles(config: &DashConfig, guild: &str, save: bool) -> Result<()> {
    let Some(mut dash) = open_guild(config, guild)? else {
        return Ok(());
    };
    let found = dash.suggest_roles().unwrap_or(0);
    print_alerts(&mut dash);

    if let Some(form) = dash.form() {
        for field in [
            SettingsField::AeRole,
            SettingsField::AmRole,
            SettingsField::CapcutRole,
            SettingsField::PrRole,
            SettingsField::PsRole,
        ] {
            println!("  {:<14} {}", field.key(), form.get(field));
        }
    }

    if save && found > 0 {
        dash.save_active_settings(Instant::now());
        if let Some(button) = dash.button(&ButtonId::Save) {
            print_button(button);
        }
    }
    Ok(())
}

/// Ask the backend's auditor for mappings and colours.
pub fn run_ai_suggest(config: &DashConfig, guild: &str, apply: bool) -> Result<()> {
    let Some(mut dash) = open_guild(config, guild)? else {
        return Ok(());
    };
    if !dash.ai_suggest() {
        print_alerts(&mut dash);
        return Ok(());
    }

    print_section("AI Suggestions");
    if let Some(suggestions) = dash.suggestions() {
        for line in render::suggestion_lines(suggestions) {
            println!("  {line}");
        }
    }

    if apply {
        let applied = dash.apply_suggestions().unwrap_or(0);
        print_alerts(&mut dash);
        println!("  {} fields updated", applied);
        dash.save_active_settings(Instant::now());
        if let Some(button) = dash.button(&ButtonId::Save) {
            print_button(button);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// primedash trigger | architect | invite
// ---------------------------------------------------------------------------

/// Fire a named backend action (`verification`, `roles`, …).
pub fn run_trigger(config: &DashConfig, guild: &str, action: &str) -> Result<()> {
    let Some(mut dash) = connect_to_guild(config, guild)? else {
        return Ok(());
    };
    dash.trigger_action(action, Instant::now());
    if let Some(button) = dash.button(&ButtonId::Trigger(action.to_string())) {
        print_button(button);
    }
    Ok(())
}

/// Generate a plan from a prompt, review it, and optionally execute it.
pub fn run_architect(config: &DashConfig, guild: &str, prompt: &str, yes: bool) -> Result<()> {
    let Some(mut dash) = connect_to_guild(config, guild)? else {
        return Ok(());
    };

    dash.set_ai_prompt(prompt);
    let planned = dash.trigger_ai_build(Instant::now());
    if let Some(button) = dash.button(&ButtonId::Architect) {
        print_button(button);
    }
    print_alerts(&mut dash);
    if !planned {
        return Ok(());
    }

    print_section("Plan Review");
    for line in render::plan_review(dash.plan().unwrap_or_default()) {
        let action = match render::parse_hex_color(&line.color) {
            Some((r, g, b)) => line.action.truecolor(r, g, b).bold(),
            None => line.action.bold(),
        };
        println!("  {} {}  {}", line.icon, action, line.target);
    }
    println!();

    let confirmed = yes || {
        let answer = prompt_line("Execute this plan? [y/N] ")?;
        matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
    };
    if !confirmed {
        println!("{}", "Plan discarded.".dimmed());
        return Ok(());
    }

    dash.execute_ai_build(Instant::now());
    if let Some(button) = dash.button(&ButtonId::Execute) {
        print_button(button);
    }
    print_alerts(&mut dash);
    for result in dash.plan_results() {
        println!("  {} {}", "·".dimmed(), result);
    }
    Ok(())
}

/// Print (and optionally open) the bot invite link for a server.
pub fn run_invite(config: &DashConfig, guild: &str, open: bool) -> Result<()> {
    let Some(dash) = connect_authenticated(config)? else {
        return Ok(());
    };
    let Some(id) = dash.find_guild(guild).map(|g| g.id.clone()) else {
        print_unknown_guild(guild);
        return Ok(());
    };
    match dash.invite_url(&id) {
        Some(url) => print_invite(&url, open),
        None => println!("{}", "Could not fetch an invite link.".yellow()),
    }
    Ok(())
}

fn print_invite(url: &str, open: bool) {
    println!("{} {}", "Invite:".bold(), url.underline());
    if open && let Err(e) = open_browser(url) {
        println!("  {}", format!("{e:#}").dimmed());
    }
}

// ---------------------------------------------------------------------------
// primedash history
// ---------------------------------------------------------------------------

/// Summarize the event log per operation.
pub fn run_history(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let history = reporter::compute_history(days);

    if history.total_calls == 0 {
        println!(
            "{}",
            "No data yet. Backend calls are logged as you use primedash.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_history_json(&history)?,
        OutputFormat::Csv => print_history_csv(&history),
        OutputFormat::Table => print_history_table(&history),
    }

    Ok(())
}

fn print_history_table(history: &History) {
    print_section("primedash Call History");
    println!(
        "  {} {}",
        "Total calls:".bold(),
        render::format_number(history.total_calls as u64)
    );
    println!(
        "  {} {}",
        "Failures:   ".bold(),
        render::format_number(history.total_failures as u64)
    );
    println!();

    println!(
        "  {:<16} {:>6} {:>8} {:>10} {:>12}",
        "Operation", "Count", "Success", "Latency", "Last"
    );
    println!("  {}", "-".repeat(56));
    for (i, op) in history.operations.iter().enumerate() {
        let line = format!(
            "  {:<16} {:>6} {:>7.1}% {:>8}ms {:>12}",
            render::truncate(&op.operation, 16),
            op.count,
            op.success_pct(),
            op.avg_latency_ms,
            op.last_outcome,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_history_json(history: &History) -> Result<()> {
    let value = serde_json::json!({
        "total_calls": history.total_calls,
        "total_failures": history.total_failures,
        "operations": history.operations.iter().map(|op| serde_json::json!({
            "operation": op.operation,
            "count": op.count,
            "failures": op.failures,
            "success_pct": op.success_pct(),
            "avg_latency_ms": op.avg_latency_ms,
            "last_outcome": op.last_outcome,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_history_csv(history: &History) {
    println!("operation,count,failures,success_pct,avg_latency_ms,last_outcome");
    for op in &history.operations {
        println!(
            "{},{},{},{:.1},{},{}",
            op.operation,
            op.count,
            op.failures,
            op.success_pct(),
            op.avg_latency_ms,
            op.last_outcome,
        );
    }
}

// ---------------------------------------------------------------------------
// primedash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    print_section("Effective primedash Configuration");
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.primedash/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.primedash/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".primedash.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".primedash.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "PRIMEDASH_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.primedash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to point primedash at your backend.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
