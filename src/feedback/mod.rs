//! Transient button feedback.
//!
//! Each action button is a small state machine: idle → pending → success or
//! error → idle. A settled button carries at most one reset deadline, and
//! [`FeedbackButton::tick`] is the only thing that moves it back to idle.
//! Starting a new action drops any pending reset.

use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackState {
    Idle,
    Pending,
    Success,
    Error,
}

impl fmt::Display for FeedbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One action button's label, enablement, and reset deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackButton {
    idle_label: String,
    label: String,
    state: FeedbackState,
    disabled: bool,
    reset_at: Option<Instant>,
}

impl FeedbackButton {
    pub fn new(idle_label: impl Into<String>) -> Self {
        let idle_label = idle_label.into();
        Self {
            label: idle_label.clone(),
            idle_label,
            state: FeedbackState::Idle,
            disabled: false,
            reset_at: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn idle_label(&self) -> &str {
        &self.idle_label
    }

    pub fn state(&self) -> FeedbackState {
        self.state
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn reset_at(&self) -> Option<Instant> {
        self.reset_at
    }

    /// Enter the pending state. `disable` blocks re-entry until the button
    /// is back to idle (or settles without a reset).
    pub fn begin(&mut self, label: impl Into<String>, disable: bool) {
        self.state = FeedbackState::Pending;
        self.label = label.into();
        self.disabled = disable;
        self.reset_at = None;
    }

    /// Show a result. With `reset_after` the button keeps its enablement
    /// until the deadline passes; without one the result sticks and the
    /// button is enabled again right away.
    pub fn settle(
        &mut self,
        state: FeedbackState,
        label: impl Into<String>,
        reset_after: Option<Duration>,
        now: Instant,
    ) {
        self.state = state;
        self.label = label.into();
        match reset_after {
            Some(delay) => self.reset_at = Some(now + delay),
            None => {
                self.reset_at = None;
                self.disabled = false;
            }
        }
    }

    /// Back to idle immediately.
    pub fn reset(&mut self) {
        self.state = FeedbackState::Idle;
        self.label = self.idle_label.clone();
        self.disabled = false;
        self.reset_at = None;
    }

    /// Apply the reset if its deadline has passed. Returns `true` when the
    /// button changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.reset_at {
            Some(deadline) if now >= deadline => {
                self.reset();
                true
            }
            _ => false,
        }
    }
}
