//! Decorative activity feed. Not connected to backend state.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::Rng;

/// Canned system messages the feed picks from.
pub const ACTIVITIES: [&str; 5] = [
    "Updated user memory for @BMR.",
    "Detected 3 potential spam messages in 'Creators Heaven'.",
    "Successfully resumed 2 pending reminders.",
    "Gemini response generated for !ask command in DM.",
    "Captcha solved correctly by @Newbie_Edits.",
];

/// Entries kept on screen.
pub const MAX_ENTRIES: usize = 8;

const MIN_INTERVAL_MS: u64 = 15_000;
const MAX_INTERVAL_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub time_label: &'static str,
    pub message: String,
}

impl ActivityEntry {
    pub fn line(&self) -> String {
        format!("System: {}", self.message)
    }
}

/// Newest-first feed that gains one random entry per interval.
#[derive(Debug)]
pub struct ActivityFeed {
    entries: VecDeque<ActivityEntry>,
    interval: Duration,
    next_at: Instant,
}

impl ActivityFeed {
    /// Feed with an interval drawn once from 15–30 s.
    pub fn new(now: Instant) -> Self {
        let ms = rand::thread_rng().gen_range(MIN_INTERVAL_MS..=MAX_INTERVAL_MS);
        Self::with_interval(now, Duration::from_millis(ms))
    }

    pub fn with_interval(now: Instant, interval: Duration) -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_ENTRIES + 1),
            interval,
            next_at: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a message at the top, dropping the oldest past the cap.
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push_front(ActivityEntry {
            time_label: "Just now",
            message: message.into(),
        });
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Add a random entry if the interval has elapsed. Returns whether one
    /// was added.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next_at {
            return false;
        }
        let pick = rand::thread_rng().gen_range(0..ACTIVITIES.len());
        self.push(ACTIVITIES[pick]);
        self.next_at = now + self.interval;
        true
    }
}
