//! Client state for one dashboard session.
//!
//! [`Dashboard`] owns everything the browser scripts kept in globals: the
//! token, the identity and guild list, the active guild and its form, the
//! AI plan, and the feedback buttons. Operations are synchronous; each
//! guild-scoped fetch is split into "start" (issue a [`Ticket`]) and
//! "apply" (accept the response only if the ticket is still current), so
//! a response for a guild that is no longer active is dropped.

pub mod generation;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::analytics;
use crate::api::types::{
    AiSuggestions, Channel, Guild, PlanStep, Role, SettingsMap, StatsResponse, User,
};
use crate::api::{ApiError, Backend};
use crate::config::schema::FeedbackConfig;
use crate::feedback::{FeedbackButton, FeedbackState};
use crate::session::SessionStore;
use crate::settings::{GuildSettings, suggest};
use crate::ui::{Navigation, Tab};

pub use generation::{RequestGeneration, Ticket};

// ---------------------------------------------------------------------------
// Labels and messages
// ---------------------------------------------------------------------------

pub const SAVE_IDLE: &str = "SYNC SIGNALS";
pub const SAVE_PENDING: &str = "SYNCING SIGNALS...";
pub const SAVE_SUCCESS: &str = "✓ SIGNALS SYNCED";
pub const SAVE_ERROR: &str = "❌ SYNC FAILED";

pub const TRIGGER_PENDING: &str = "SENDING...";
pub const TRIGGER_SUCCESS: &str = "✓ SENT";
pub const TRIGGER_ERROR: &str = "❌ ERROR";
pub const TRIGGER_FAIL: &str = "❌ FAIL";

pub const PLAN_IDLE: &str = "GENERATE BLUEPRINT";
pub const PLAN_PENDING: &str = "BRAINSTORMING STRUCTURE...";
pub const PLAN_SUCCESS: &str = "PLAN GENERATED";
pub const PLAN_ERROR: &str = "AI CALCULATION ERROR";

pub const EXECUTE_IDLE: &str = "MANIFEST ARCHITECTURE";
pub const EXECUTE_PENDING: &str = "MANIFESTING ARCHITECTURE...";
pub const EXECUTE_SUCCESS: &str = "✓ ACTION COMPLETE - IT'S DONE!";
pub const EXECUTE_ERROR: &str = "EXECUTION ERROR";

pub const SUGGEST_IDLE: &str = "AI SUGGEST";
pub const SUGGEST_SCANNING: &str = "SCANNING...";

pub const EMPTY_PROMPT_ALERT: &str = "Please describe your server architecture first.";
const PLAN_FALLBACK_ERROR: &str = "Brainstorm failed";
const EXECUTE_FALLBACK_ERROR: &str = "Manifestation failed";
const SUGGEST_FALLBACK_ERROR: &str = "AI suggestion failed";

/// Idle label of a trigger button.
pub fn trigger_idle_label(action: &str) -> String {
    format!("POST {}", action.to_uppercase())
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Identifies one feedback button.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ButtonId {
    Save,
    Architect,
    Execute,
    Suggest,
    Trigger(String),
}

/// What selecting a guild card did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// The bot is present; the configuration view was opened.
    OpenConfig { loaded: bool },
    /// The bot is missing; open this invite URL in a browser.
    Invite(String),
}

/// Dashboard client state over a [`Backend`].
pub struct Dashboard<B: Backend> {
    backend: B,
    store: SessionStore,
    feedback: FeedbackConfig,

    token: Option<String>,
    authenticated: bool,
    user: Option<User>,
    guilds: Vec<Guild>,
    stats: Option<StatsResponse>,

    navigation: Navigation,
    active_guild: Option<Guild>,
    generation: RequestGeneration,
    form: Option<GuildSettings>,
    roles: Vec<Role>,
    channels: Vec<Channel>,

    ai_prompt: String,
    plan: Option<Vec<PlanStep>>,
    plan_review_visible: bool,
    review_hide_at: Option<Instant>,
    plan_results: Vec<String>,
    suggestions: Option<AiSuggestions>,

    save_button: FeedbackButton,
    architect_button: FeedbackButton,
    execute_button: FeedbackButton,
    suggest_button: FeedbackButton,
    trigger_buttons: BTreeMap<String, FeedbackButton>,

    alerts: Vec<String>,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: B, store: SessionStore, feedback: FeedbackConfig) -> Self {
        Self {
            backend,
            store,
            feedback,
            token: None,
            authenticated: false,
            user: None,
            guilds: Vec::new(),
            stats: None,
            navigation: Navigation::default(),
            active_guild: None,
            generation: RequestGeneration::default(),
            form: None,
            roles: Vec::new(),
            channels: Vec::new(),
            ai_prompt: String::new(),
            plan: None,
            plan_review_visible: false,
            review_hide_at: None,
            plan_results: Vec::new(),
            suggestions: None,
            save_button: FeedbackButton::new(SAVE_IDLE),
            architect_button: FeedbackButton::new(PLAN_IDLE),
            execute_button: FeedbackButton::new(EXECUTE_IDLE),
            suggest_button: FeedbackButton::new(SUGGEST_IDLE),
            trigger_buttons: BTreeMap::new(),
            alerts: Vec::new(),
        }
    }

    // -- Accessors --

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn guilds(&self) -> &[Guild] {
        &self.guilds
    }

    /// Guilds the user can administer, in backend order.
    pub fn manageable_guilds(&self) -> Vec<&Guild> {
        self.guilds.iter().filter(|g| g.is_manageable()).collect()
    }

    /// Manageable guild by id, or by case-insensitive name.
    pub fn find_guild(&self, query: &str) -> Option<&Guild> {
        let manageable = self.manageable_guilds();
        manageable
            .iter()
            .find(|g| g.id == query)
            .or_else(|| manageable.iter().find(|g| g.name.eq_ignore_ascii_case(query)))
            .copied()
    }

    pub fn stats(&self) -> Option<&StatsResponse> {
        self.stats.as_ref()
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.navigation.switch_to(tab);
    }

    pub fn active_guild(&self) -> Option<&Guild> {
        self.active_guild.as_ref()
    }

    pub fn form(&self) -> Option<&GuildSettings> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut GuildSettings> {
        self.form.as_mut()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn ai_prompt(&self) -> &str {
        &self.ai_prompt
    }

    pub fn set_ai_prompt(&mut self, prompt: impl Into<String>) {
        self.ai_prompt = prompt.into();
    }

    pub fn plan(&self) -> Option<&[PlanStep]> {
        self.plan.as_deref()
    }

    pub fn plan_review_visible(&self) -> bool {
        self.plan_review_visible
    }

    /// Per-step results of the last successful execution.
    pub fn plan_results(&self) -> &[String] {
        &self.plan_results
    }

    pub fn suggestions(&self) -> Option<&AiSuggestions> {
        self.suggestions.as_ref()
    }

    pub fn button(&self, id: &ButtonId) -> Option<&FeedbackButton> {
        match id {
            ButtonId::Save => Some(&self.save_button),
            ButtonId::Architect => Some(&self.architect_button),
            ButtonId::Execute => Some(&self.execute_button),
            ButtonId::Suggest => Some(&self.suggest_button),
            ButtonId::Trigger(action) => self.trigger_buttons.get(action),
        }
    }

    /// Drain pending alert messages.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    // -- Session --

    /// Verify `token` against the backend and load identity, guilds and
    /// stats. Any failure logs out silently. Returns whether the session
    /// is authenticated.
    pub fn boot(&mut self, token: Option<String>) -> bool {
        let Some(token) = token else {
            self.logout();
            return false;
        };

        match self.backend.me(&token) {
            Ok(me) if me.authenticated => {
                self.token = Some(token);
                self.user = me.user;
                self.guilds = me.guilds;
                self.authenticated = true;
                self.fetch_stats();
                true
            }
            Ok(_) => {
                analytics::debug("boot: backend reports unauthenticated session");
                self.logout();
                false
            }
            Err(e) => {
                analytics::debug(&format!("boot failed: {e}"));
                self.logout();
                false
            }
        }
    }

    /// Forget the token everywhere and drop all session state.
    pub fn logout(&mut self) {
        self.store.clear();
        self.token = None;
        self.authenticated = false;
        self.user = None;
        self.guilds.clear();
        self.stats = None;
        self.leave_guild();
        self.active_guild = None;
    }

    // -- Stats --

    /// Refresh counters. Failures keep the previous stats.
    pub fn fetch_stats(&mut self) -> bool {
        let Some(token) = self.token.as_deref() else {
            return false;
        };
        match self.backend.stats(token) {
            Ok(stats) => {
                self.stats = Some(stats);
                true
            }
            Err(e) => {
                analytics::debug(&format!("stats fetch failed: {e}"));
                false
            }
        }
    }

    // -- Guild selection --

    /// Act on a guild card: open its configuration when the bot is there,
    /// otherwise look up an invite URL. `None` for an unknown guild or a
    /// failed invite lookup.
    pub fn select_card(&mut self, guild_id: &str) -> Option<CardAction> {
        let guild = self.find_guild(guild_id)?.clone();
        if guild.bot_present {
            let loaded = self.open_config(&guild.id);
            Some(CardAction::OpenConfig { loaded })
        } else {
            self.invite_url(&guild.id).map(CardAction::Invite)
        }
    }

    pub fn invite_url(&self, guild_id: &str) -> Option<String> {
        match self.backend.invite_url(guild_id) {
            Ok(url) => Some(url),
            Err(e) => {
                analytics::debug(&format!("invite lookup failed for {guild_id}: {e}"));
                None
            }
        }
    }

    /// Make `guild_id` the active guild and switch to the customization
    /// tab. Everything tied to the previous guild is dropped. Returns the
    /// ticket for the settings fetch.
    pub fn begin_open_config(&mut self, guild_id: &str) -> Option<Ticket> {
        let guild = self.find_guild(guild_id)?.clone();
        self.token.as_ref()?;

        self.leave_guild();
        let ticket = self.generation.issue(&guild.id);
        self.active_guild = Some(guild);
        self.navigation.switch_to(Tab::Customization);
        Some(ticket)
    }

    /// Make `guild_id` active without fetching anything.
    pub fn select_guild(&mut self, guild_id: &str) -> bool {
        self.begin_open_config(guild_id).is_some()
    }

    /// Open the configuration for a guild: fetch its settings and, once
    /// they load, its roles. Returns whether the settings loaded.
    pub fn open_config(&mut self, guild_id: &str) -> bool {
        let Some(ticket) = self.begin_open_config(guild_id) else {
            return false;
        };
        let Some(token) = self.token.clone() else {
            return false;
        };
        let result = self.backend.guild_settings(&token, ticket.guild_id());
        if self.apply_settings(&ticket, result) {
            self.fetch_roles();
            true
        } else {
            false
        }
    }

    /// Accept a settings response if its ticket is still current.
    pub fn apply_settings(
        &mut self,
        ticket: &Ticket,
        result: Result<SettingsMap, ApiError>,
    ) -> bool {
        if !self.accepts(ticket, "settings") {
            return false;
        }
        match result {
            Ok(settings) => {
                self.form = Some(GuildSettings::from_server(&settings));
                true
            }
            Err(e) => {
                analytics::debug(&format!("settings fetch failed for {}: {e}", ticket.guild_id()));
                false
            }
        }
    }

    /// Ticket for a fetch against the active guild.
    pub fn ticket(&self) -> Option<Ticket> {
        let guild = self.active_guild.as_ref()?;
        Some(self.generation.issue(&guild.id))
    }

    /// Refresh the role cache for the active guild.
    pub fn fetch_roles(&mut self) -> bool {
        let (Some(ticket), Some(token)) = (self.ticket(), self.token.clone()) else {
            return false;
        };
        let result = self.backend.roles(&token, ticket.guild_id());
        self.apply_roles(&ticket, result)
    }

    /// Accept a roles response if its ticket is still current. Failures
    /// leave the cache unchanged.
    pub fn apply_roles(&mut self, ticket: &Ticket, result: Result<Vec<Role>, ApiError>) -> bool {
        if !self.accepts(ticket, "roles") {
            return false;
        }
        match result {
            Ok(roles) => {
                self.roles = roles;
                true
            }
            Err(e) => {
                analytics::debug(&format!("roles fetch failed for {}: {e}", ticket.guild_id()));
                false
            }
        }
    }

    /// Refresh the text/announcement channel list for the active guild.
    pub fn fetch_channels(&mut self) -> bool {
        let (Some(ticket), Some(token)) = (self.ticket(), self.token.clone()) else {
            return false;
        };
        let result = self.backend.channels(&token, ticket.guild_id());
        if !self.accepts(&ticket, "channels") {
            return false;
        }
        match result {
            Ok(channels) => {
                self.channels = channels.into_iter().filter(|c| c.is_text_like()).collect();
                true
            }
            Err(e) => {
                analytics::debug(&format!("channels fetch failed for {}: {e}", ticket.guild_id()));
                false
            }
        }
    }

    fn accepts(&self, ticket: &Ticket, what: &str) -> bool {
        let same_guild = self
            .active_guild
            .as_ref()
            .is_some_and(|g| g.id == ticket.guild_id());
        if self.generation.is_current(ticket) && same_guild {
            return true;
        }
        analytics::debug(&format!(
            "discarding stale {what} response for guild {} (generation {} < {})",
            ticket.guild_id(),
            ticket.generation(),
            self.generation.current()
        ));
        false
    }

    /// Drop everything tied to the active guild and invalidate in-flight
    /// tickets.
    fn leave_guild(&mut self) {
        self.generation.bump();
        self.form = None;
        self.roles.clear();
        self.channels.clear();
        self.plan = None;
        self.plan_review_visible = false;
        self.review_hide_at = None;
        self.plan_results.clear();
        self.suggestions = None;
        self.architect_button.reset();
        self.execute_button.reset();
    }

    // -- Settings form --

    /// Post the whole form for the active guild.
    pub fn save_active_settings(&mut self, now: Instant) -> bool {
        let (Some(guild), Some(form), Some(token)) =
            (&self.active_guild, &self.form, self.token.as_deref())
        else {
            return false;
        };

        self.save_button.begin(SAVE_PENDING, false);
        let result = self
            .backend
            .save_guild_settings(token, &guild.id, &form.to_payload());
        let saved = match result {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                analytics::debug(&format!(
                    "settings save rejected: {}",
                    response.error.unwrap_or_default()
                ));
                false
            }
            Err(e) => {
                analytics::debug(&format!("settings save failed: {e}"));
                false
            }
        };

        let delay = Some(ms(self.feedback.save_reset_ms));
        if saved {
            self.save_button
                .settle(FeedbackState::Success, SAVE_SUCCESS, delay, now);
        } else {
            self.save_button
                .settle(FeedbackState::Error, SAVE_ERROR, delay, now);
        }
        saved
    }

    /// Fill the software-role fields from the role cache, fetching roles
    /// first if the cache is empty. Returns how many fields were mapped.
    pub fn suggest_roles(&mut self) -> Option<usize> {
        self.form.as_ref()?;

        if self.roles.is_empty() {
            self.suggest_button.begin(SUGGEST_SCANNING, false);
            self.fetch_roles();
            self.suggest_button.reset();
        }

        let form = self.form.as_mut()?;
        let found = suggest::suggest_roles(&self.roles, form);
        self.alerts.push(suggest::suggestion_message(found));
        Some(found)
    }

    // -- Actions --

    /// Fire a named action at the active guild. Returns the settled button
    /// state, or `None` when nothing was sent.
    pub fn trigger_action(&mut self, action: &str, now: Instant) -> Option<FeedbackState> {
        let guild = self.active_guild.as_ref()?;
        let token = self.token.as_deref()?;

        let button = self
            .trigger_buttons
            .entry(action.to_string())
            .or_insert_with(|| FeedbackButton::new(trigger_idle_label(action)));
        if button.is_disabled() {
            return None;
        }

        button.begin(TRIGGER_PENDING, true);
        let (state, label) = match self.backend.trigger(token, &guild.id, action) {
            Ok(response) if response.is_success() => (FeedbackState::Success, TRIGGER_SUCCESS),
            Ok(response) => {
                analytics::debug(&format!(
                    "trigger '{action}' rejected: {}",
                    response.error.unwrap_or_default()
                ));
                (FeedbackState::Error, TRIGGER_ERROR)
            }
            Err(e) if e.is_transport() => {
                analytics::debug(&format!("trigger '{action}' failed: {e}"));
                (FeedbackState::Error, TRIGGER_FAIL)
            }
            Err(e) => {
                analytics::debug(&format!("trigger '{action}' failed: {e}"));
                (FeedbackState::Error, TRIGGER_ERROR)
            }
        };
        button.settle(state, label, Some(ms(self.feedback.trigger_reset_ms)), now);
        Some(state)
    }

    /// Ask the backend for a plan from the current prompt. On success the
    /// plan is stored and the review is shown.
    pub fn trigger_ai_build(&mut self, now: Instant) -> bool {
        let (Some(guild), Some(token)) = (&self.active_guild, self.token.as_deref()) else {
            return false;
        };
        let prompt = self.ai_prompt.trim();
        if prompt.is_empty() {
            self.alerts.push(EMPTY_PROMPT_ALERT.to_string());
            return false;
        }
        if self.architect_button.is_disabled() {
            return false;
        }

        self.architect_button.begin(PLAN_PENDING, true);
        let result = self
            .backend
            .ai_plan(token, &guild.id, prompt)
            .and_then(|response| {
                if response.is_success() {
                    Ok(response.plan)
                } else {
                    Err(application_error(response.error, PLAN_FALLBACK_ERROR))
                }
            });

        match result {
            Ok(plan) => {
                self.plan = Some(plan);
                self.plan_review_visible = true;
                self.review_hide_at = None;
                self.plan_results.clear();
                self.execute_button.reset();
                self.architect_button
                    .settle(FeedbackState::Success, PLAN_SUCCESS, None, now);
                true
            }
            Err(e) => {
                self.architect_button.settle(
                    FeedbackState::Error,
                    PLAN_ERROR,
                    Some(ms(self.feedback.plan_error_reset_ms)),
                    now,
                );
                self.alerts.push(e.to_string());
                false
            }
        }
    }

    /// Execute the stored plan. Without one this does nothing at all.
    pub fn execute_ai_build(&mut self, now: Instant) -> bool {
        let (Some(plan), Some(guild), Some(token)) =
            (&self.plan, &self.active_guild, self.token.as_deref())
        else {
            return false;
        };
        if self.execute_button.is_disabled() {
            return false;
        }

        self.execute_button.begin(EXECUTE_PENDING, true);
        let result = self
            .backend
            .ai_execute(token, &guild.id, plan)
            .and_then(|response| {
                if response.is_success() {
                    Ok(response.results)
                } else {
                    Err(application_error(response.error, EXECUTE_FALLBACK_ERROR))
                }
            });

        match result {
            Ok(results) => {
                let delay = ms(self.feedback.execute_success_reset_ms);
                self.execute_button.settle(
                    FeedbackState::Success,
                    EXECUTE_SUCCESS,
                    Some(delay),
                    now,
                );
                self.plan = None;
                self.plan_results = results;
                self.ai_prompt.clear();
                self.review_hide_at = Some(now + delay);
                true
            }
            Err(e) => {
                self.execute_button.settle(
                    FeedbackState::Error,
                    EXECUTE_ERROR,
                    Some(ms(self.feedback.execute_error_reset_ms)),
                    now,
                );
                self.alerts.push(e.to_string());
                false
            }
        }
    }

    /// Ask the backend to propose channel/role mappings and role colours.
    pub fn ai_suggest(&mut self) -> bool {
        let (Some(ticket), Some(token)) = (self.ticket(), self.token.clone()) else {
            return false;
        };
        let result = self
            .backend
            .ai_suggest(&token, ticket.guild_id())
            .and_then(|response| {
                if response.is_success() {
                    Ok(response.suggestions.unwrap_or_default())
                } else {
                    Err(application_error(response.error, SUGGEST_FALLBACK_ERROR))
                }
            });
        if !self.accepts(&ticket, "suggestion") {
            return false;
        }
        match result {
            Ok(suggestions) => {
                self.suggestions = Some(suggestions);
                true
            }
            Err(e) => {
                self.alerts.push(e.to_string());
                false
            }
        }
    }

    /// Copy the proposed mappings into the form and send the proposed role
    /// colours. Returns how many form fields were set, or `None` when there
    /// is nothing to apply.
    pub fn apply_suggestions(&mut self) -> Option<usize> {
        let suggestions = self.suggestions.as_ref()?;
        let guild = self.active_guild.as_ref()?;
        let token = self.token.as_deref()?;
        let form = self.form.as_mut()?;

        let applied = form.apply_mappings(&suggestions.mappings);
        if !suggestions.role_color_suggestions.is_empty() {
            let result = self
                .backend
                .apply_suggestions(token, &guild.id, &suggestions.role_color_suggestions)
                .and_then(|response| {
                    if response.is_success() {
                        Ok(())
                    } else {
                        Err(application_error(response.error, "Colour update failed"))
                    }
                });
            if let Err(e) = result {
                self.alerts.push(e.to_string());
            }
        }
        Some(applied)
    }

    // -- Timers --

    /// Run every due reset. Returns whether anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for button in [
            &mut self.save_button,
            &mut self.architect_button,
            &mut self.execute_button,
            &mut self.suggest_button,
        ] {
            changed |= button.tick(now);
        }
        for button in self.trigger_buttons.values_mut() {
            changed |= button.tick(now);
        }
        if let Some(deadline) = self.review_hide_at
            && now >= deadline
        {
            self.plan_review_visible = false;
            self.review_hide_at = None;
            changed = true;
        }
        changed
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn application_error(error: Option<String>, fallback: &str) -> ApiError {
    ApiError::Application(
        error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| fallback.to_string()),
    )
}
