//! Toolkit-independent view models: tabs, clock, back-to-top, activity feed.

pub mod activity;
pub mod clock;
pub mod scroll;

use std::fmt;
use std::str::FromStr;

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Overview,
    Servers,
    Customization,
    Leaderboard,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Self::Overview,
        Self::Servers,
        Self::Customization,
        Self::Leaderboard,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Servers => "servers",
            Self::Customization => "customization",
            Self::Leaderboard => "leaderboard",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id().to_uppercase())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tab| tab.id() == wanted)
            .ok_or_else(|| format!("unknown tab '{s}'"))
    }
}

/// Tab selection. Exactly one tab is active at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    active: Tab,
}

impl Navigation {
    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn switch_to(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn is_active(&self, tab: Tab) -> bool {
        self.active == tab
    }
}
