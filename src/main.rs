use anyhow::Result;
use clap::{Parser, Subcommand};

use primedash::ui::Tab;
use primedash::{analytics, cli, config};

#[derive(Debug, Parser)]
#[command(name = "primedash")]
#[command(about = "Operator dashboard for the Prime AI bot")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in with the URL the backend redirected you to (or a bare token)
    Login {
        /// Redirect URL containing `session_token=`, or the token itself
        redirect: Option<String>,
        /// Open the login page in the default browser first
        #[arg(long)]
        open: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show session, backend and config status
    Status,
    /// Show counters and the leaderboard
    Stats,
    /// List servers you can manage
    Guilds,
    /// Open a server: show its settings, or its invite link if the bot is missing
    Open {
        /// Server id or name
        guild: String,
    },
    /// Show or edit a server's settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// List a server's roles
    Roles {
        /// Server id or name
        guild: String,
    },
    /// List a server's text and announcement channels
    Channels {
        /// Server id or name
        guild: String,
    },
    /// Map software roles (AE, AM, CapCut, PR, PS) by role name
    SuggestRoles {
        /// Server id or name
        guild: String,
        /// Save the form after mapping
        #[arg(long)]
        save: bool,
    },
    /// Ask the backend's AI auditor for channel/role mappings and colours
    AiSuggest {
        /// Server id or name
        guild: String,
        /// Apply the mappings and colours, then save
        #[arg(long)]
        apply: bool,
    },
    /// Fire a backend action (verification, roles)
    Trigger {
        /// Server id or name
        guild: String,
        /// Action name
        action: String,
    },
    /// Describe a server layout; review and execute the AI plan
    Architect {
        /// Server id or name
        guild: String,
        /// What to build
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
        /// Execute without asking
        #[arg(long, short)]
        yes: bool,
    },
    /// Print the bot invite link for a server
    Invite {
        /// Server id or name
        guild: String,
        /// Don't open the link in a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Live dashboard, redrawn every second
    Live {
        /// Stop after N frames
        #[arg(long)]
        frames: Option<u64>,
        /// Tab to show: overview, servers, customization, leaderboard
        #[arg(long)]
        tab: Option<Tab>,
        /// Open this server's settings (id or name) before the first frame
        #[arg(long)]
        guild: Option<String>,
    },
    /// Summarize logged backend calls
    History {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    /// Show the settings form
    Show {
        /// Server id or name
        guild: String,
    },
    /// Set fields (key=value ...) and save
    Set {
        /// Server id or name
        guild: String,
        /// Assignments such as prefix=? or log_channel=123
        #[arg(required = true)]
        assignments: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.primedash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. backend.base_url
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let config = config::load();
    analytics::init(&config.logging);

    match app.command {
        Commands::Login { redirect, open } => cli::run_login(&config, redirect.as_deref(), open),
        Commands::Logout => cli::run_logout(&config),
        Commands::Status => cli::run_status(&config),
        Commands::Stats => cli::run_stats(&config),
        Commands::Guilds => cli::run_guilds(&config),
        Commands::Open { guild } => cli::run_open(&config, &guild),
        Commands::Settings { action } => match action {
            SettingsAction::Show { guild } => cli::run_settings_show(&config, &guild),
            SettingsAction::Set { guild, assignments } => {
                cli::run_settings_set(&config, &guild, &assignments)
            }
        },
        Commands::Roles { guild } => cli::run_roles(&config, &guild),
        Commands::Channels { guild } => cli::run_channels(&config, &guild),
        Commands::SuggestRoles { guild, save } => cli::run_suggest_roles(&config, &guild, save),
        Commands::AiSuggest { guild, apply } => cli::run_ai_suggest(&config, &guild, apply),
        Commands::Trigger { guild, action } => cli::run_trigger(&config, &guild, &action),
        Commands::Architect { guild, prompt, yes } => {
            cli::run_architect(&config, &guild, &prompt.join(" "), yes)
        }
        Commands::Invite { guild, no_open } => cli::run_invite(&config, &guild, !no_open),
        Commands::Live { frames, tab, guild } => {
            cli::live::run_live(&config, frames, tab, guild.as_deref())
        }
        Commands::History { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(fmt, days)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
