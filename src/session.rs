//! Session persistence.
//!
//! The browser original kept theme, search history and the last API results
//! in localStorage. Here the same whitelist lives in one JSON document in the
//! platform data dir. Reads always fall back to defaults and writes are best
//! effort; a missing or unwritable data dir just means a cold start, never a
//! crash.

use crate::models::Coin;
use crate::state::ViewState;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Maximum number of remembered search terms.
pub const HISTORY_LIMIT: usize = 5;

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Theme preference; `None` means the user never toggled it
    pub dark_mode: Option<bool>,
    /// Most-recent-first distinct search terms, at most [`HISTORY_LIMIT`]
    pub search_history: Vec<String>,
    /// Cached full listing
    pub coins: Vec<Coin>,
    /// Search term that was active on exit
    pub search_term: String,
    /// Cached displayed list
    pub filtered_coins: Vec<Coin>,
}

impl Session {
    /// Capture the persistable subset of the view state.
    pub fn capture(state: &ViewState, dark_mode: bool, history: &[String]) -> Self {
        Self {
            dark_mode: Some(dark_mode),
            search_history: history.to_vec(),
            coins: state.coins.clone(),
            search_term: state.search_term.clone(),
            filtered_coins: state.filtered_coins.clone(),
        }
    }

    /// Restore the cached lists and term into a fresh view state.
    /// Status stays Idle; the cache is a stopgap until the first fetch lands.
    pub fn restore_into(&self, state: &mut ViewState) {
        state.coins = self.coins.clone();
        state.filtered_coins = self.filtered_coins.clone();
        state.search_term = self.search_term.clone();
    }
}

/// Push a term to the front of the history, deduplicated and capped.
pub fn remember_term(history: &mut Vec<String>, term: &str) {
    let term = term.trim();
    if term.is_empty() {
        return;
    }
    history.retain(|t| t != term);
    history.insert(0, term.to_string());
    history.truncate(HISTORY_LIMIT);
}

/// Where sessions are read from and written to.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Store at the platform default location.
    pub fn at_default_location() -> Self {
        Self {
            path: dirs::data_dir().map(|p| p.join("coinwatch").join("session.json")),
        }
    }

    /// Store at an explicit path.
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A store that never reads or writes anything.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Load the saved session, or a default one when there is nothing usable.
    pub fn load(&self) -> Session {
        let Some(path) = &self.path else {
            return Session::default();
        };
        fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Persist the session. Callers treat failures as non-fatal.
    pub fn save(&self, session: &Session) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }
        let content =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write session file: {}", path.display()))?;
        Ok(())
    }
}
