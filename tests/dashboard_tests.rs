/// Integration tests for the dashboard client state machine.
///
/// A scripted in-memory backend stands in for the HTTP transport. Each test
/// sets the responses it needs and inspects the calls the dashboard made.
use std::cell::RefCell;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use primedash::api::types::{
    ActionResponse, Channel, ColorSuggestion, Guild, MeResponse, PlanResponse, PlanStep, Role,
    SettingsMap, StatsResponse, SuggestResponse, User,
};
use primedash::api::{ApiError, Backend};
use primedash::cli::live::LiveView;
use primedash::config::DashConfig;
use primedash::config::schema::FeedbackConfig;
use primedash::dashboard::{ButtonId, CardAction, Dashboard};
use primedash::feedback::FeedbackState;
use primedash::render;
use primedash::session::SessionStore;
use primedash::settings::SettingsField;
use primedash::ui::Tab;
use serde_json::json;

// ---------------------------------------------------------------------------
// Scripted backend
// ---------------------------------------------------------------------------

struct Scripted {
    calls: RefCell<Vec<String>>,
    me: RefCell<Result<MeResponse, ApiError>>,
    stats: RefCell<Result<StatsResponse, ApiError>>,
    settings: RefCell<Result<SettingsMap, ApiError>>,
    saved: RefCell<Option<SettingsMap>>,
    save: RefCell<Result<ActionResponse, ApiError>>,
    roles: RefCell<Result<Vec<Role>, ApiError>>,
    channels: RefCell<Result<Vec<Channel>, ApiError>>,
    trigger: RefCell<Result<ActionResponse, ApiError>>,
    plan: RefCell<Result<PlanResponse, ApiError>>,
    execute: RefCell<Result<ActionResponse, ApiError>>,
    suggest: RefCell<Result<SuggestResponse, ApiError>>,
    apply: RefCell<Result<ActionResponse, ApiError>>,
    color_updates: RefCell<Vec<ColorSuggestion>>,
    invite: RefCell<Result<String, ApiError>>,
}

fn success() -> ActionResponse {
    serde_json::from_value(json!({"status": "success"})).unwrap()
}

impl Scripted {
    fn new() -> Self {
        let me: MeResponse = serde_json::from_value(json!({
            "authenticated": true,
            "user": {"id": "5", "name": "bmr", "avatar": null},
            "guilds": [
                {"id": "100", "name": "Creators Heaven", "permissions": "8", "bot_present": true},
                {"id": "200", "name": "Edit Lab", "permissions": 32, "bot_present": true},
                {"id": "300", "name": "Lobby", "permissions": 0, "bot_present": true},
                {"id": "400", "name": "New Place", "permissions": 8, "bot_present": false},
            ]
        }))
        .unwrap();
        let stats: StatsResponse =
            serde_json::from_value(json!({"users": 12345, "messages": 1234})).unwrap();
        Self {
            calls: RefCell::new(Vec::new()),
            me: RefCell::new(Ok(me)),
            stats: RefCell::new(Ok(stats)),
            settings: RefCell::new(Ok(SettingsMap::new())),
            saved: RefCell::new(None),
            save: RefCell::new(Ok(success())),
            roles: RefCell::new(Ok(Vec::new())),
            channels: RefCell::new(Ok(Vec::new())),
            trigger: RefCell::new(Ok(success())),
            plan: RefCell::new(Ok(PlanResponse::default())),
            execute: RefCell::new(Ok(success())),
            suggest: RefCell::new(Ok(SuggestResponse::default())),
            apply: RefCell::new(Ok(success())),
            color_updates: RefCell::new(Vec::new()),
            invite: RefCell::new(Ok("https://invite.example/bot".to_string())),
        }
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl Backend for Scripted {
    fn me(&self, token: &str) -> Result<MeResponse, ApiError> {
        self.record(format!("me:{token}"));
        self.me.borrow().clone()
    }

    fn stats(&self, _token: &str) -> Result<StatsResponse, ApiError> {
        self.record("stats".to_string());
        self.stats.borrow().clone()
    }

    fn guild_settings(&self, _token: &str, guild_id: &str) -> Result<SettingsMap, ApiError> {
        self.record(format!("settings.load:{guild_id}"));
        self.settings.borrow().clone()
    }

    fn save_guild_settings(
        &self,
        _token: &str,
        guild_id: &str,
        settings: &SettingsMap,
    ) -> Result<ActionResponse, ApiError> {
        self.record(format!("settings.save:{guild_id}"));
        *self.saved.borrow_mut() = Some(settings.clone());
        self.save.borrow().clone()
    }

    fn roles(&self, _token: &str, guild_id: &str) -> Result<Vec<Role>, ApiError> {
        self.record(format!("roles:{guild_id}"));
        self.roles.borrow().clone()
    }

    fn channels(&self, _token: &str, guild_id: &str) -> Result<Vec<Channel>, ApiError> {
        self.record(format!("channels:{guild_id}"));
        self.channels.borrow().clone()
    }

    fn trigger(
        &self,
        _token: &str,
        guild_id: &str,
        action: &str,
    ) -> Result<ActionResponse, ApiError> {
        self.record(format!("trigger:{guild_id}:{action}"));
        self.trigger.borrow().clone()
    }

    fn ai_plan(
        &self,
        _token: &str,
        guild_id: &str,
        prompt: &str,
    ) -> Result<PlanResponse, ApiError> {
        self.record(format!("ai.plan:{guild_id}:{prompt}"));
        self.plan.borrow().clone()
    }

    fn ai_execute(
        &self,
        _token: &str,
        guild_id: &str,
        plan: &[PlanStep],
    ) -> Result<ActionResponse, ApiError> {
        self.record(format!("ai.execute:{guild_id}:{}", plan.len()));
        self.execute.borrow().clone()
    }

    fn ai_suggest(&self, _token: &str, guild_id: &str) -> Result<SuggestResponse, ApiError> {
        self.record(format!("ai.suggest:{guild_id}"));
        self.suggest.borrow().clone()
    }

    fn apply_suggestions(
        &self,
        _token: &str,
        guild_id: &str,
        color_updates: &[ColorSuggestion],
    ) -> Result<ActionResponse, ApiError> {
        self.record(format!("ai.apply:{guild_id}"));
        *self.color_updates.borrow_mut() = color_updates.to_vec();
        self.apply.borrow().clone()
    }

    fn invite_url(&self, guild_id: &str) -> Result<String, ApiError> {
        self.record(format!("invite:{guild_id}"));
        self.invite.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn temp_store(name: &str) -> SessionStore {
    let dir: PathBuf = std::env::temp_dir().join(format!(
        "primedash-dash-{}-{}",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_dir_all(&dir);
    SessionStore::at(dir.join("session.json"))
}

fn dashboard(name: &str, backend: Scripted) -> Dashboard<Scripted> {
    Dashboard::new(backend, temp_store(name), FeedbackConfig::default())
}

/// Dashboard booted with token "tok".
fn booted(name: &str, backend: Scripted) -> Dashboard<Scripted> {
    let mut dash = dashboard(name, backend);
    assert!(dash.boot(Some("tok".to_string())));
    dash
}

fn role(id: &str, name: &str) -> Role {
    Role {
        id: id.to_string(),
        name: name.to_string(),
        color: 0,
        managed: false,
    }
}

fn plan_response() -> PlanResponse {
    serde_json::from_value(json!({
        "status": "success",
        "plan": [
            {"action": "create_category", "name": "EDITING"},
            {"action": "create_channel", "name": "clips", "type": "text", "category": "EDITING"},
        ]
    }))
    .unwrap()
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[test]
fn boot_loads_identity_guilds_and_stats() {
    let dash = booted("boot-ok", Scripted::new());
    assert!(dash.is_authenticated());
    assert_eq!(dash.token(), Some("tok"));
    assert_eq!(dash.user().map(|u| u.name.as_str()), Some("bmr"));
    assert_eq!(dash.guilds().len(), 4);
    assert_eq!(dash.stats().map(|s| s.users), Some(12345));
    assert_eq!(dash.backend().calls(), vec!["me:tok", "stats"]);

    let manageable: Vec<&str> = dash
        .manageable_guilds()
        .iter()
        .map(|g| g.id.as_str())
        .collect();
    assert_eq!(manageable, vec!["100", "200", "400"]);
}

#[test]
fn boot_without_token_makes_no_call() {
    let mut dash = dashboard("boot-none", Scripted::new());
    assert!(!dash.boot(None));
    assert!(!dash.is_authenticated());
    assert!(dash.backend().calls().is_empty());
}

#[test]
fn boot_unauthenticated_logs_out() {
    let backend = Scripted::new();
    *backend.me.borrow_mut() = Ok(MeResponse::default());
    let store = temp_store("boot-unauth");
    store.save("stale").unwrap();

    let mut dash = Dashboard::new(backend, store.clone(), FeedbackConfig::default());
    assert!(!dash.boot(Some("stale".to_string())));
    assert!(!dash.is_authenticated());
    assert!(dash.token().is_none());
    assert!(store.load().is_none());
    assert_eq!(dash.backend().count("stats"), 0);
}

#[test]
fn boot_401_and_transport_errors_log_out_silently() {
    for error in [
        ApiError::Unauthorized,
        ApiError::Transport("connection refused".into()),
        ApiError::Http(500),
    ] {
        let backend = Scripted::new();
        *backend.me.borrow_mut() = Err(error);
        let mut dash = dashboard("boot-err", backend);
        assert!(!dash.boot(Some("tok".to_string())));
        assert!(!dash.is_authenticated());
        assert!(dash.user().is_none());
        assert!(dash.take_alerts().is_empty());
    }
}

#[test]
fn stats_failure_keeps_previous_stats() {
    let mut dash = booted("stats-fail", Scripted::new());
    *dash.backend().stats.borrow_mut() = Err(ApiError::Transport("timeout".into()));
    assert!(!dash.fetch_stats());
    assert_eq!(dash.stats().map(|s| s.messages), Some(1234));
}

#[test]
fn logout_drops_session_state() {
    let store = temp_store("logout");
    store.save("tok").unwrap();
    let mut dash = Dashboard::new(Scripted::new(), store.clone(), FeedbackConfig::default());
    assert!(dash.boot(store.load()));
    assert!(dash.open_config("100"));

    dash.logout();
    assert!(!dash.is_authenticated());
    assert!(dash.active_guild().is_none());
    assert!(dash.form().is_none());
    assert!(dash.guilds().is_empty());
    assert!(store.load().is_none());
}

// ---------------------------------------------------------------------------
// Guild grid and configuration
// ---------------------------------------------------------------------------

#[test]
fn no_manageable_guilds_renders_only_placeholder() {
    let backend = Scripted::new();
    *backend.me.borrow_mut() = serde_json::from_value(json!({
        "authenticated": true,
        "user": {"id": "5", "name": "bmr"},
        "guilds": [{"id": "1", "name": "Lurker", "permissions": "1024"}]
    }))
    .map_err(|e| ApiError::Transport(e.to_string()));
    let dash = booted("grid-empty", backend);
    assert!(render::guild_cards(dash.guilds()).is_empty());
    assert_eq!(
        render::guild_grid(dash.guilds()),
        vec!["No managed servers found.".to_string()]
    );
}

#[test]
fn open_config_fills_fallbacks_and_fetches_roles() {
    let backend = Scripted::new();
    *backend.settings.borrow_mut() = Ok(json!({"log_channel": "777", "vibe": ""})
        .as_object()
        .cloned()
        .unwrap());
    let mut dash = booted("open", backend);

    assert!(dash.open_config("100"));
    assert_eq!(dash.navigation().active(), Tab::Customization);
    assert_eq!(dash.active_guild().map(|g| g.id.as_str()), Some("100"));

    let form = dash.form().unwrap();
    assert_eq!(form.get(SettingsField::Prefix), "!");
    assert_eq!(form.get(SettingsField::Vibe), "chill");
    assert_eq!(form.get(SettingsField::LogChannel), "777");
    assert_eq!(form.get(SettingsField::MutedRole), "");
    assert_eq!(dash.backend().count("roles:100"), 1);
}

#[test]
fn settings_failure_skips_role_fetch() {
    let backend = Scripted::new();
    *backend.settings.borrow_mut() = Err(ApiError::Http(403));
    let mut dash = booted("open-fail", backend);
    assert!(!dash.open_config("100"));
    assert!(dash.form().is_none());
    assert_eq!(dash.backend().count("roles"), 0);
    assert!(dash.take_alerts().is_empty());
}

#[test]
fn open_config_rejects_unmanageable_guild() {
    let mut dash = booted("open-lobby", Scripted::new());
    assert!(!dash.open_config("300"));
    assert!(dash.active_guild().is_none());
    assert_eq!(dash.backend().count("settings.load"), 0);
}

#[test]
fn find_guild_by_name() {
    let dash = booted("find", Scripted::new());
    assert_eq!(dash.find_guild("edit lab").map(|g| g.id.as_str()), Some("200"));
    assert!(dash.find_guild("Lobby").is_none());
}

#[test]
fn select_card_opens_config_or_invite() {
    let mut dash = booted("cards", Scripted::new());
    assert_eq!(
        dash.select_card("100"),
        Some(CardAction::OpenConfig { loaded: true })
    );
    assert_eq!(
        dash.select_card("400"),
        Some(CardAction::Invite("https://invite.example/bot".to_string()))
    );
    assert_eq!(dash.backend().count("invite:400"), 1);

    *dash.backend().invite.borrow_mut() = Err(ApiError::Transport("down".into()));
    assert_eq!(dash.select_card("400"), None);
}

#[test]
fn stale_settings_response_is_discarded() {
    let mut dash = booted("stale-settings", Scripted::new());

    let first = dash.begin_open_config("100").unwrap();
    let second = dash.begin_open_config("200").unwrap();

    let late: SettingsMap = json!({"prefix": "?"}).as_object().cloned().unwrap();
    assert!(!dash.apply_settings(&first, Ok(late)));
    assert!(dash.form().is_none());

    let current: SettingsMap = json!({"prefix": "$"}).as_object().cloned().unwrap();
    assert!(dash.apply_settings(&second, Ok(current)));
    assert_eq!(dash.form().unwrap().get(SettingsField::Prefix), "$");
    assert_eq!(dash.active_guild().map(|g| g.id.as_str()), Some("200"));
}

#[test]
fn stale_roles_response_is_discarded() {
    let mut dash = booted("stale-roles", Scripted::new());
    assert!(dash.open_config("100"));
    let ticket = dash.ticket().unwrap();

    assert!(dash.open_config("200"));
    assert!(!dash.apply_roles(&ticket, Ok(vec![role("1", "Old Guild Role")])));
    assert!(dash.roles().is_empty());
}

#[test]
fn roles_failure_keeps_cache() {
    let backend = Scripted::new();
    *backend.roles.borrow_mut() = Ok(vec![role("1", "Editors")]);
    let mut dash = booted("roles-cache", backend);
    assert!(dash.open_config("100"));
    assert_eq!(dash.roles().len(), 1);

    *dash.backend().roles.borrow_mut() = Err(ApiError::Transport("reset".into()));
    assert!(!dash.fetch_roles());
    assert_eq!(dash.roles().len(), 1);
}

#[test]
fn channels_keep_text_like_only() {
    let backend = Scripted::new();
    *backend.channels.borrow_mut() = Ok(serde_json::from_value(json!([
        {"id": "1", "name": "general", "type": 0},
        {"id": "2", "name": "voice", "type": 2},
        {"id": "3", "name": "news", "type": 5},
    ]))
    .unwrap());
    let mut dash = booted("channels", backend);
    assert!(dash.select_guild("100"));
    assert!(dash.fetch_channels());
    let names: Vec<&str> = dash.channels().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["general", "news"]);
}

// ---------------------------------------------------------------------------
// Save and role suggestions
// ---------------------------------------------------------------------------

#[test]
fn save_posts_every_field_and_resets() {
    let mut dash = booted("save", Scripted::new());
    assert!(dash.open_config("100"));
    dash.form_mut()
        .unwrap()
        .set(SettingsField::CustomSystemPrompt, "be nice");

    let t0 = Instant::now();
    assert!(dash.save_active_settings(t0));
    let saved = dash.backend().saved.borrow().clone().unwrap();
    assert_eq!(saved.len(), 20);
    assert_eq!(saved["custom_system_prompt"], json!("be nice"));
    assert_eq!(saved["prefix"], json!("!"));

    let button = dash.button(&ButtonId::Save).unwrap();
    assert_eq!(button.label(), "✓ SIGNALS SYNCED");
    assert!(!button.is_disabled());

    dash.tick(t0 + Duration::from_secs(2));
    assert_eq!(dash.button(&ButtonId::Save).unwrap().state(), FeedbackState::Idle);
}

#[test]
fn save_failure_shows_sync_failed() {
    let mut dash = booted("save-fail", Scripted::new());
    assert!(dash.open_config("100"));
    *dash.backend().save.borrow_mut() = Err(ApiError::Transport("reset".into()));
    assert!(!dash.save_active_settings(Instant::now()));
    assert_eq!(dash.button(&ButtonId::Save).unwrap().label(), "❌ SYNC FAILED");
}

#[test]
fn save_without_active_guild_does_nothing() {
    let mut dash = booted("save-none", Scripted::new());
    assert!(!dash.save_active_settings(Instant::now()));
    assert_eq!(dash.backend().count("settings.save"), 0);
}

#[test]
fn suggest_roles_maps_premiere_only() {
    let backend = Scripted::new();
    *backend.roles.borrow_mut() = Ok(vec![role("1", "Premiere Pro")]);
    let mut dash = booted("suggest", backend);
    assert!(dash.open_config("100"));

    assert_eq!(dash.suggest_roles(), Some(1));
    let form = dash.form().unwrap();
    assert_eq!(form.get(SettingsField::PrRole), "1");
    for field in [
        SettingsField::AeRole,
        SettingsField::AmRole,
        SettingsField::CapcutRole,
        SettingsField::PsRole,
    ] {
        assert_eq!(form.get(field), "", "{field}");
    }
    assert_eq!(
        dash.take_alerts(),
        vec!["Successfully mapped 1 roles based on server scanning!".to_string()]
    );
}

#[test]
fn suggest_roles_fetches_when_cache_empty() {
    let backend = Scripted::new();
    *backend.roles.borrow_mut() = Err(ApiError::Transport("down".into()));
    let mut dash = booted("suggest-fetch", backend);
    assert!(dash.open_config("100"));
    assert!(dash.roles().is_empty());

    *dash.backend().roles.borrow_mut() = Ok(vec![role("9", "Photoshop")]);
    assert_eq!(dash.suggest_roles(), Some(1));
    assert_eq!(dash.backend().count("roles:100"), 2);
    assert_eq!(dash.form().unwrap().get(SettingsField::PsRole), "9");
    assert_eq!(
        dash.button(&ButtonId::Suggest).unwrap().label(),
        "AI SUGGEST"
    );
}

#[test]
fn suggest_roles_reports_no_matches() {
    let backend = Scripted::new();
    *backend.roles.borrow_mut() = Ok(vec![role("1", "Moderator")]);
    let mut dash = booted("suggest-none", backend);
    assert!(dash.open_config("100"));
    assert_eq!(dash.suggest_roles(), Some(0));
    assert!(dash.take_alerts()[0].starts_with("No clear matches found."));
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

#[test]
fn trigger_success_cycles_back_to_idle() {
    let mut dash = booted("trigger-ok", Scripted::new());
    assert!(dash.select_guild("100"));

    let t0 = Instant::now();
    assert_eq!(
        dash.trigger_action("verification", t0),
        Some(FeedbackState::Success)
    );
    let id = ButtonId::Trigger("verification".to_string());
    let button = dash.button(&id).unwrap();
    assert_eq!(button.label(), "✓ SENT");
    assert!(button.is_disabled());

    // Disabled until the reset; a second press sends nothing.
    assert_eq!(dash.trigger_action("verification", t0), None);
    assert_eq!(dash.backend().count("trigger:100:verification"), 1);

    assert!(!dash.tick(t0 + Duration::from_millis(1999)));
    assert!(dash.tick(t0 + Duration::from_secs(2)));
    let button = dash.button(&id).unwrap();
    assert_eq!(button.state(), FeedbackState::Idle);
    assert_eq!(button.label(), "POST VERIFICATION");
    assert!(!button.is_disabled());
}

#[test]
fn trigger_failure_labels() {
    let cases: [(Result<ActionResponse, ApiError>, &str); 3] = [
        (Err(ApiError::Transport("refused".into())), "❌ FAIL"),
        (Err(ApiError::Http(500)), "❌ ERROR"),
        (
            Ok(serde_json::from_value(json!({"error": "Roles channel not set"})).unwrap()),
            "❌ ERROR",
        ),
    ];
    for (response, label) in cases {
        let mut dash = booted("trigger-fail", Scripted::new());
        *dash.backend().trigger.borrow_mut() = response;
        assert!(dash.select_guild("100"));
        assert_eq!(
            dash.trigger_action("roles", Instant::now()),
            Some(FeedbackState::Error)
        );
        assert_eq!(
            dash.button(&ButtonId::Trigger("roles".to_string()))
                .unwrap()
                .label(),
            label
        );
    }
}

#[test]
fn trigger_without_active_guild_is_noop() {
    let mut dash = booted("trigger-none", Scripted::new());
    assert_eq!(dash.trigger_action("roles", Instant::now()), None);
    assert_eq!(dash.backend().count("trigger"), 0);
}

// ---------------------------------------------------------------------------
// AI architect
// ---------------------------------------------------------------------------

#[test]
fn empty_prompt_alerts_without_request() {
    let mut dash = booted("plan-empty", Scripted::new());
    assert!(dash.select_guild("100"));
    dash.set_ai_prompt("   ");
    assert!(!dash.trigger_ai_build(Instant::now()));
    assert_eq!(
        dash.take_alerts(),
        vec!["Please describe your server architecture first.".to_string()]
    );
    assert_eq!(dash.backend().count("ai.plan"), 0);
}

#[test]
fn plan_errors_are_distinguished() {
    let cases: [(Result<PlanResponse, ApiError>, &str); 4] = [
        (Err(ApiError::Unauthorized), "Unauthorized: Please log in again."),
        (Err(ApiError::Http(502)), "HTTP Error: 502"),
        (
            Ok(serde_json::from_value(json!({"status": "error"})).unwrap()),
            "Brainstorm failed",
        ),
        (
            Ok(serde_json::from_value(json!({"error": "No prompt provided"})).unwrap()),
            "No prompt provided",
        ),
    ];
    for (response, message) in cases {
        let mut dash = booted("plan-err", Scripted::new());
        *dash.backend().plan.borrow_mut() = response;
        assert!(dash.select_guild("100"));
        dash.set_ai_prompt("gaming hub");

        let t0 = Instant::now();
        assert!(!dash.trigger_ai_build(t0));
        assert_eq!(dash.take_alerts(), vec![message.to_string()]);
        let button = dash.button(&ButtonId::Architect).unwrap();
        assert_eq!(button.label(), "AI CALCULATION ERROR");
        assert!(button.is_disabled());
        assert!(dash.plan().is_none());

        dash.tick(t0 + Duration::from_secs(3));
        assert!(!dash.button(&ButtonId::Architect).unwrap().is_disabled());
    }
}

#[test]
fn execute_without_plan_is_noop() {
    let mut dash = booted("exec-none", Scripted::new());
    assert!(dash.select_guild("100"));
    let before = dash.backend().calls();

    assert!(!dash.execute_ai_build(Instant::now()));
    assert_eq!(dash.backend().calls(), before);
    let button = dash.button(&ButtonId::Execute).unwrap();
    assert_eq!(button.state(), FeedbackState::Idle);
    assert!(dash.take_alerts().is_empty());
}

#[test]
fn plan_then_execute() {
    let backend = Scripted::new();
    *backend.plan.borrow_mut() = Ok(plan_response());
    *backend.execute.borrow_mut() = Ok(serde_json::from_value(json!({
        "status": "success",
        "results": ["Created category EDITING", "Created channel clips"]
    }))
    .unwrap());
    let mut dash = booted("plan-exec", backend);
    assert!(dash.select_guild("100"));
    dash.set_ai_prompt("  an editing community  ");

    let t0 = Instant::now();
    assert!(dash.trigger_ai_build(t0));
    assert_eq!(dash.backend().count("ai.plan:100:an editing community"), 1);
    assert_eq!(dash.plan().map(<[PlanStep]>::len), Some(2));
    assert!(dash.plan_review_visible());
    let architect = dash.button(&ButtonId::Architect).unwrap();
    assert_eq!(architect.label(), "PLAN GENERATED");
    assert!(!architect.is_disabled());
    assert!(architect.reset_at().is_none());

    assert!(dash.execute_ai_build(t0));
    assert_eq!(dash.backend().count("ai.execute:100:2"), 1);
    assert!(dash.plan().is_none());
    assert_eq!(dash.ai_prompt(), "");
    assert_eq!(dash.plan_results().len(), 2);
    assert_eq!(
        dash.button(&ButtonId::Execute).unwrap().label(),
        "✓ ACTION COMPLETE - IT'S DONE!"
    );
    assert!(dash.plan_review_visible());

    // A second execute has no plan left.
    assert!(!dash.execute_ai_build(t0));
    assert_eq!(dash.backend().count("ai.execute"), 1);

    dash.tick(t0 + Duration::from_secs(4));
    assert!(!dash.plan_review_visible());
    assert_eq!(
        dash.button(&ButtonId::Execute).unwrap().state(),
        FeedbackState::Idle
    );
}

#[test]
fn execute_failure_keeps_plan() {
    let backend = Scripted::new();
    *backend.plan.borrow_mut() = Ok(plan_response());
    *backend.execute.borrow_mut() =
        Ok(serde_json::from_value(json!({"status": "error"})).unwrap());
    let mut dash = booted("exec-fail", backend);
    assert!(dash.select_guild("100"));
    dash.set_ai_prompt("hub");

    let t0 = Instant::now();
    assert!(dash.trigger_ai_build(t0));
    assert!(!dash.execute_ai_build(t0));
    assert_eq!(dash.take_alerts(), vec!["Manifestation failed".to_string()]);
    assert_eq!(
        dash.button(&ButtonId::Execute).unwrap().label(),
        "EXECUTION ERROR"
    );
    assert!(dash.plan().is_some());
    assert_eq!(dash.ai_prompt(), "hub");

    dash.tick(t0 + Duration::from_secs(3));
    assert!(!dash.button(&ButtonId::Execute).unwrap().is_disabled());
}

#[test]
fn switching_guild_drops_plan() {
    let backend = Scripted::new();
    *backend.plan.borrow_mut() = Ok(plan_response());
    let mut dash = booted("plan-switch", backend);
    assert!(dash.select_guild("100"));
    dash.set_ai_prompt("hub");
    assert!(dash.trigger_ai_build(Instant::now()));

    assert!(dash.select_guild("200"));
    assert!(dash.plan().is_none());
    assert!(!dash.plan_review_visible());
    assert!(!dash.execute_ai_build(Instant::now()));
    assert_eq!(dash.backend().count("ai.execute"), 0);
}

// ---------------------------------------------------------------------------
// AI suggestions
// ---------------------------------------------------------------------------

#[test]
fn ai_suggest_then_apply() {
    let backend = Scripted::new();
    *backend.suggest.borrow_mut() = Ok(serde_json::from_value(json!({
        "status": "success",
        "suggestions": {
            "mappings": {"welcome_channel": "11", "muted_role": "22"},
            "role_color_suggestions": [{"id": "22", "suggested_color": "#808080"}],
            "reasoning": "names match"
        }
    }))
    .unwrap());
    let mut dash = booted("ai-suggest", backend);
    assert!(dash.open_config("100"));

    assert!(dash.ai_suggest());
    assert_eq!(
        dash.suggestions().and_then(|s| s.reasoning.as_deref()),
        Some("names match")
    );

    assert_eq!(dash.apply_suggestions(), Some(2));
    let form = dash.form().unwrap();
    assert_eq!(form.get(SettingsField::WelcomeChannel), "11");
    assert_eq!(form.get(SettingsField::MutedRole), "22");
    assert_eq!(dash.backend().count("ai.apply:100"), 1);
    assert_eq!(
        dash.backend().color_updates.borrow()[0].suggested_color,
        "#808080"
    );
    assert!(dash.take_alerts().is_empty());
}

#[test]
fn ai_suggest_error_alerts() {
    let backend = Scripted::new();
    *backend.suggest.borrow_mut() = Ok(serde_json::from_value(json!({
        "status": "error",
        "error": "AI module unavailable."
    }))
    .unwrap());
    let mut dash = booted("ai-suggest-err", backend);
    assert!(dash.open_config("100"));
    assert!(!dash.ai_suggest());
    assert_eq!(dash.take_alerts(), vec!["AI module unavailable.".to_string()]);
    assert_eq!(dash.apply_suggestions(), None);
}

// ---------------------------------------------------------------------------
// Live view
// ---------------------------------------------------------------------------

#[test]
fn live_frame_shows_header_and_grid() {
    let mut config = DashConfig::default();
    config.ui.activity_feed = false;
    let mut dash = booted("live", Scripted::new());

    let now = Instant::now();
    let mut view = LiveView::new(&config, now);
    let lines = view.frame(&mut dash, now);

    assert!(lines[0].starts_with("PRIME AI"));
    assert!(lines[0].contains("bmr"));
    assert!(lines.iter().any(|l| l.ends_with("12,345")));
    assert!(lines.iter().any(|l| l.contains("Creators Heaven")));
    assert!(lines.iter().any(|l| l.contains("INVITE REQUIRED")));
    assert!(!lines.iter().any(|l| l.contains("Lobby")));
    assert!(!lines.iter().any(|l| l == "↑ back to top"));
    assert_eq!(lines[1], "[OVERVIEW]  servers  customization  leaderboard");
}

#[test]
fn live_frame_follows_active_tab() {
    let mut config = DashConfig::default();
    config.ui.activity_feed = false;
    let backend = Scripted::new();
    *backend.stats.borrow_mut() = Ok(serde_json::from_value(json!({
        "users": 3,
        "messages": 10,
        "leaderboard": [{"id": "123456789", "level": 7, "xp": 900}]
    }))
    .unwrap());
    let mut dash = booted("live-tabs", backend);
    let now = Instant::now();
    let mut view = LiveView::new(&config, now);

    dash.switch_tab(Tab::Servers);
    let lines = view.frame(&mut dash, now);
    assert_eq!(lines[1], "overview  [SERVERS]  customization  leaderboard");
    assert!(lines.iter().any(|l| l.contains("embed/avatars/0.png")));
    assert!(!lines.iter().any(|l| l.starts_with("Users")));

    dash.switch_tab(Tab::Leaderboard);
    let lines = view.frame(&mut dash, now);
    assert!(lines.iter().any(|l| l == "LEADERBOARD"));
    assert!(lines.iter().any(|l| l.contains("ID: 6789")));
    assert!(!lines.iter().any(|l| l.contains("Creators Heaven")));

    dash.switch_tab(Tab::Customization);
    let lines = view.frame(&mut dash, now);
    assert!(lines.iter().any(|l| l.starts_with("No server open.")));

    assert!(dash.open_config("100"));
    assert_eq!(dash.navigation().active(), Tab::Customization);
    let lines = view.frame(&mut dash, now);
    assert!(lines[1].contains("[CUSTOMIZATION]"));
    assert!(lines.iter().any(|l| l == "CREATORS HEAVEN"));
    assert!(lines.iter().any(|l| l == "[CORE]"));
}

#[test]
fn live_frame_survives_bad_clock_format() {
    let mut config = DashConfig::default();
    config.ui.activity_feed = false;
    config.ui.clock_format = "%H:%M:%".to_string();
    let mut dash = booted("live-clock", Scripted::new());

    let now = Instant::now();
    let lines = LiveView::new(&config, now).frame(&mut dash, now);
    assert!(lines[0].starts_with("PRIME AI"));
}

#[test]
fn identity_header_uses_layout_fallback() {
    let user = User {
        id: "5".to_string(),
        name: "nova".to_string(),
        avatar: None,
    };
    let mut config = DashConfig::default();
    config.ui.layout = primedash::config::schema::Layout::Classic;
    config.apply_layout();
    assert_eq!(
        render::identity(&user, config.ui.avatar_fallback),
        "nova  [N]"
    );
}

#[test]
fn guild_ids_deserialize_from_numbers() {
    let guild: Guild =
        serde_json::from_value(json!({"id": 123456789012345678u64, "name": "G", "permissions": 8}))
            .unwrap();
    assert_eq!(guild.id, "123456789012345678");
}
