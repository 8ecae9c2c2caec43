//! `primedash live`: the dashboard redrawn once a second.
//!
//! Each frame shows the clock, the tab bar and the active tab's panel:
//! stats, servers and the activity feed on the overview; the full server
//! list; the open server's settings form; or the leaderboard. Feedback
//! resets and feed entries advance on the same one-second tick; stats are
//! refetched every [`STATS_REFRESH`].

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::Backend;
use crate::config::DashConfig;
use crate::config::schema::AvatarFallback;
use crate::dashboard::Dashboard;
use crate::render;
use crate::ui::Tab;
use crate::ui::activity::ActivityFeed;
use crate::ui::clock::Clock;
use crate::ui::scroll::BackToTop;

const TICK: Duration = Duration::from_secs(1);
const STATS_REFRESH: Duration = Duration::from_secs(30);

/// Rows that fit without scrolling, and the pixel height of one row.
const VIEWPORT_ROWS: usize = 24;
const ROW_HEIGHT_PX: usize = 20;

/// Per-frame state of the live view.
pub struct LiveView {
    clock: Clock,
    back_to_top: BackToTop,
    feed: Option<ActivityFeed>,
    avatar_fallback: AvatarFallback,
    last_stats: Instant,
}

impl LiveView {
    pub fn new(config: &DashConfig, now: Instant) -> Self {
        Self {
            clock: Clock::new(config.ui.clock_format.clone()),
            back_to_top: BackToTop::new(config.ui.back_to_top_threshold),
            feed: config.ui.activity_feed.then(|| ActivityFeed::new(now)),
            avatar_fallback: config.ui.avatar_fallback,
            last_stats: now,
        }
    }

    /// Advance timers and build one frame.
    pub fn frame<B: Backend>(&mut self, dash: &mut Dashboard<B>, now: Instant) -> Vec<String> {
        dash.tick(now);
        if let Some(feed) = self.feed.as_mut() {
            feed.tick(now);
        }
        if now.duration_since(self.last_stats) >= STATS_REFRESH {
            dash.fetch_stats();
            self.last_stats = now;
        }

        self.back_to_top.activate();
        let mut lines = self.body(dash);

        let overflow = lines.len().saturating_sub(VIEWPORT_ROWS) * ROW_HEIGHT_PX;
        self.back_to_top
            .scroll_to(u32::try_from(overflow).unwrap_or(u32::MAX));
        if self.back_to_top.is_visible() {
            lines.push(String::new());
            lines.push("↑ back to top".to_string());
        }
        lines
    }

    fn body<B: Backend>(&self, dash: &Dashboard<B>) -> Vec<String> {
        let mut lines = Vec::new();

        let who = dash
            .user()
            .map(|u| render::identity(u, self.avatar_fallback))
            .unwrap_or_else(|| "not signed in".to_string());
        lines.push(format!("PRIME AI  {}  {}", self.clock.now(), who));
        lines.push(tab_bar(dash.navigation().active()));
        lines.push(String::new());

        match dash.navigation().active() {
            Tab::Overview => self.overview(dash, &mut lines),
            Tab::Servers => servers(dash, &mut lines),
            Tab::Customization => customization(dash, &mut lines),
            Tab::Leaderboard => {
                if let Some(rows) = dash.stats().and_then(render::leaderboard) {
                    lines.push("LEADERBOARD".to_string());
                    lines.extend(rows);
                }
            }
        }
        lines
    }

    fn overview<B: Backend>(&self, dash: &Dashboard<B>, lines: &mut Vec<String>) {
        if let Some(stats) = dash.stats() {
            lines.extend(render::stats_panel(stats));
            lines.push(String::new());
        }

        lines.push("SERVERS".to_string());
        lines.extend(render::guild_grid(dash.guilds()));

        if let Some(feed) = &self.feed
            && !feed.is_empty()
        {
            lines.push(String::new());
            lines.push("ACTIVITY".to_string());
            for entry in feed.entries() {
                lines.push(format!("{:<9} {}", entry.time_label, entry.line()));
            }
        }
    }
}

/// `[ACTIVE]` followed by the other tab ids.
pub fn tab_bar(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|&tab| {
            if tab == active {
                format!("[{tab}]")
            } else {
                tab.id().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn servers<B: Backend>(dash: &Dashboard<B>, lines: &mut Vec<String>) {
    lines.push("SERVERS".to_string());
    let cards = render::guild_cards(dash.guilds());
    if cards.is_empty() {
        lines.push(render::NO_GUILDS_PLACEHOLDER.to_string());
        return;
    }
    for (card, line) in cards.iter().zip(render::guild_grid(dash.guilds())) {
        lines.push(line);
        lines.push(format!("  {}", card.icon_url));
    }
}

fn customization<B: Backend>(dash: &Dashboard<B>, lines: &mut Vec<String>) {
    match (dash.active_guild(), dash.form()) {
        (Some(guild), Some(form)) => {
            lines.push(guild.name.to_uppercase());
            lines.extend(render::settings_form(form));
        }
        _ => lines.push("No server open. Start with `primedash live --guild <server>`.".to_string()),
    }
}

/// Run the live view for `frames` ticks, or until interrupted. `guild`
/// opens that server's configuration first; `tab` picks the panel shown.
pub fn run_live(
    config: &DashConfig,
    frames: Option<u64>,
    tab: Option<Tab>,
    guild: Option<&str>,
) -> Result<()> {
    let Some(mut dash) = super::connect_authenticated(config)? else {
        return Ok(());
    };
    if let Some(guild) = guild {
        let Some(id) = dash.find_guild(guild).map(|g| g.id.clone()) else {
            super::print_unknown_guild(guild);
            return Ok(());
        };
        if !dash.open_config(&id) {
            println!(
                "{}",
                "Could not load this server's settings. Try again in a moment.".yellow()
            );
            return Ok(());
        }
    }
    if let Some(tab) = tab {
        dash.switch_tab(tab);
    }

    let mut view = LiveView::new(config, Instant::now());
    let mut drawn = 0u64;
    loop {
        let lines = view.frame(&mut dash, Instant::now());

        let mut out = io::stdout().lock();
        write!(out, "\x1b[2J\x1b[H").context("failed to clear screen")?;
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                writeln!(out, "{}", line.bold().cyan())?;
            } else {
                writeln!(out, "{line}")?;
            }
        }
        out.flush().context("failed to flush stdout")?;

        drawn += 1;
        if frames.is_some_and(|limit| drawn >= limit) {
            return Ok(());
        }
        thread::sleep(TICK);
    }
}
