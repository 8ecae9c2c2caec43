//! Session bootstrap and token persistence.
//!
//! The backend hands out a session token by redirecting the browser to
//! `/dashboard/index.html?session_token=…`. The user pastes that URL (or
//! just the token) into `primedash login`; from then on the token lives in
//! `~/.primedash/session.json` until a failed identity check clears it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Query parameter carrying the token on the login redirect.
pub const TOKEN_PARAM: &str = "session_token";

// ---------------------------------------------------------------------------
// Persistent store
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    saved_at: String,
}

/// File-backed token storage, one token at a time.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at `~/.primedash/session.json`.
    pub fn open_default() -> Result<Self> {
        let dir = crate::config::data_dir().context("could not determine home directory")?;
        Ok(Self::at(dir.join("session.json")))
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted token, if any. Unreadable files count as no token.
    pub fn load(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let stored: StoredSession = serde_json::from_str(&content).ok()?;
        Some(stored.token).filter(|t| !t.is_empty())
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create session directory")?;
        }
        let stored = StoredSession {
            token: token.to_string(),
            saved_at: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&stored).context("failed to serialize session")?;
        fs::write(&self.path, json).context("failed to write session file")
    }

    /// Remove the persisted token. Missing files are fine.
    pub fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

// ---------------------------------------------------------------------------
// Token extraction
// ---------------------------------------------------------------------------

fn token_param_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([?&])session_token=([^&#]*)&?").expect("static regex is valid")
    })
}

/// Split a login redirect into its token and the URL without it.
///
/// Returns `(None, input)` when the URL has no non-empty `session_token`.
pub fn extract_token(url: &str) -> (Option<String>, String) {
    let re = token_param_re();
    let Some(caps) = re.captures(url) else {
        return (None, url.to_string());
    };

    let raw = &caps[2];
    let token = urlencoding::decode(raw)
        .map(|t| t.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    // Keep the separator only if another parameter follows.
    let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
    let separator = &caps[1];
    let consumed_tail = caps[0].ends_with('&');
    let mut stripped = String::with_capacity(url.len());
    stripped.push_str(&url[..whole.start]);
    if consumed_tail {
        stripped.push_str(separator);
    }
    stripped.push_str(&url[whole.end..]);

    if token.is_empty() {
        (None, stripped)
    } else {
        (Some(token), stripped)
    }
}

/// Outcome of session bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    pub token: Option<String>,
    /// The redirect URL with the token stripped, when one was given.
    pub cleaned_url: Option<String>,
}

/// Resolve the session token for this run.
///
/// `input` is a login-redirect URL or a bare token. A token found there is
/// persisted; otherwise the stored token is used. With no token at all the
/// store is cleared, matching a logout.
pub fn bootstrap(input: Option<&str>, store: &SessionStore) -> Result<Bootstrap> {
    let mut cleaned_url = None;
    let mut fresh = None;

    if let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) {
        if raw.contains("://") || raw.contains('?') {
            let (token, stripped) = extract_token(raw);
            fresh = token;
            cleaned_url = Some(stripped);
        } else {
            fresh = Some(raw.to_string());
        }
    }

    let token = match fresh {
        Some(token) => {
            store.save(&token)?;
            Some(token)
        }
        None => store.load(),
    };

    if token.is_none() {
        store.clear();
    }

    Ok(Bootstrap { token, cleaned_url })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
