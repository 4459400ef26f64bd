//! Application state and trigger scheduling.
//!
//! Three things can kick off a request: the refresh timer, the debounce
//! timer behind the search box, and a manual refresh. None of them cancel
//! each other. Every in-flight request reports back over one channel and the
//! main loop is the single consumer that feeds results to the state machine,
//! so whichever settles last has the final word.

use crate::api::{ApiError, CoinrankingClient};
use crate::cli::Args;
use crate::config::Config;
use crate::models::Coin;
use crate::session::{Session, SessionStore, remember_term};
use crate::state::ViewState;
use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Outcome of a settled request, delivered over the update channel.
#[derive(Debug)]
pub enum StateUpdate {
    /// A full-listing fetch settled
    Fetched(Result<Vec<Coin>, ApiError>),
    /// A search settled
    Searched(Result<Vec<Coin>, ApiError>),
}

/// Application state.
pub struct App {
    /// The synchronized view state the UI renders from
    pub state: ViewState,
    /// API client
    client: CoinrankingClient,
    /// Session persistence
    store: SessionStore,
    /// Producer side of the update channel, cloned into request tasks
    updates_tx: mpsc::UnboundedSender<StateUpdate>,
    /// Consumer side, drained once per tick
    updates_rx: mpsc::UnboundedReceiver<StateUpdate>,
    /// Live contents of the search box
    pub input: String,
    /// When the pending debounced search should fire
    debounce_deadline: Option<Instant>,
    /// Quiet window after the last keystroke
    pub debounce: Duration,
    /// Refresh interval for the periodic full fetch
    pub refresh_interval: Duration,
    /// Last time the refresh timer fired
    pub last_refresh: Option<Instant>,
    /// Dark or light theme
    pub dark_mode: bool,
    /// Most-recent-first distinct search terms
    pub search_history: Vec<String>,
    /// Which history entry is highlighted, if any
    pub history_cursor: Option<usize>,
    /// Whether the history row is rendered at all
    pub show_history: bool,
    /// Listing size requested from the API
    pub limit: u32,
    /// Completed refresh count
    pub iteration: u64,
    /// Maximum iterations (0 = infinite)
    pub max_iterations: u64,
    /// Is the app running
    pub running: bool,
    /// Batch mode (non-interactive)
    pub batch_mode: bool,
}

impl App {
    /// Create the application from CLI args, config and a session store.
    pub fn new(args: &Args, config: &Config, store: SessionStore) -> Result<Self> {
        let api_key = args
            .api_key
            .clone()
            .unwrap_or_else(|| config.api.api_key.clone());
        let timeout = args.timeout.unwrap_or(config.general.timeout);
        let client = CoinrankingClient::new(
            api_key,
            config.api.base_url.clone(),
            config.api.api_host.clone(),
            timeout,
        )?;

        // Enforce a floor so a typo'd delay cannot hammer the API.
        let delay = args.delay.unwrap_or(config.general.refresh_interval).max(1.0);
        let debounce_ms = args.debounce.unwrap_or(config.general.debounce_ms);

        let session = store.load();
        let dark_mode = if args.dark {
            true
        } else if args.light {
            false
        } else {
            session.dark_mode.unwrap_or(config.display.dark_mode)
        };

        let mut search_history = session.search_history.clone();
        search_history.truncate(crate::session::HISTORY_LIMIT);

        let mut state = ViewState::new();
        if !args.no_restore {
            session.restore_into(&mut state);
        }
        let mut input = state.search_term.clone();

        // An explicit query wins over whatever the last session left behind.
        if let Some(query) = &args.query {
            input = query.clone();
            state.set_search_term(query);
        }

        let (updates_tx, updates_rx) = mpsc::unbounded_channel();

        Ok(Self {
            state,
            client,
            store,
            updates_tx,
            updates_rx,
            input,
            debounce_deadline: None,
            debounce: Duration::from_millis(debounce_ms),
            refresh_interval: Duration::from_secs_f64(delay),
            last_refresh: None,
            dark_mode,
            search_history,
            history_cursor: None,
            show_history: config.display.show_history,
            limit: args.limit.unwrap_or(config.general.limit),
            iteration: 0,
            max_iterations: args.iterations,
            running: true,
            batch_mode: args.batch,
        })
    }

    /// Whether an API key was supplied at all.
    pub fn has_api_key(&self) -> bool {
        self.client.has_key()
    }

    /// Check if the periodic refresh is due.
    pub fn needs_refresh(&self) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => last.elapsed() >= self.refresh_interval,
        }
    }

    /// Drive the timers and apply any settled results.
    /// Called once per event-loop tick.
    pub fn tick(&mut self) {
        self.drain_updates();

        if let Some(deadline) = self.debounce_deadline {
            if Instant::now() >= deadline {
                self.debounce_deadline = None;
                let term = self.input.trim().to_string();
                if !term.is_empty() {
                    self.dispatch_search(&term);
                }
            }
        }

        // The periodic timer always refetches the full listing, even while a
        // search is on screen; the state machine keeps the search results in
        // place and only the cached listing moves.
        if self.needs_refresh() {
            self.last_refresh = Some(Instant::now());
            self.dispatch_fetch();
        }
    }

    /// Apply every update that has settled since the last tick, in arrival
    /// order. Arrival order is completion order, not dispatch order.
    pub fn drain_updates(&mut self) {
        while let Ok(update) = self.updates_rx.try_recv() {
            self.apply_update(update);
        }
    }

    fn apply_update(&mut self, update: StateUpdate) {
        match update {
            StateUpdate::Fetched(outcome) => {
                self.state.finish_fetch(outcome.map_err(|e| e.to_string()));
                // Only full refresh cycles count towards -n, so the flag
                // means the same thing in interactive and batch mode.
                self.iteration += 1;
            }
            StateUpdate::Searched(outcome) => {
                self.state.finish_search(outcome.map_err(|e| e.to_string()));
            }
        }
    }

    /// Start a full-listing fetch in the background.
    pub fn dispatch_fetch(&mut self) {
        self.state.begin_loading();
        let client = self.client.clone();
        let limit = self.limit;
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(StateUpdate::Fetched(client.fetch_coins(limit).await));
        });
    }

    /// Start a search in the background.
    pub fn dispatch_search(&mut self, term: &str) {
        self.state.begin_loading();
        let client = self.client.clone();
        let term = term.to_string();
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(StateUpdate::Searched(client.search_coins(&term).await));
        });
    }

    /// Manual refresh: re-run whatever the user is currently looking at.
    pub fn manual_refresh(&mut self) {
        self.last_refresh = Some(Instant::now());
        if self.state.is_searching() {
            let term = self.state.search_term.trim().to_string();
            self.dispatch_search(&term);
        } else {
            self.dispatch_fetch();
        }
    }

    /// A printable character typed into the search box.
    pub fn input_char(&mut self, c: char) {
        self.input.push(c);
        self.on_input_changed();
    }

    /// Backspace in the search box.
    pub fn input_backspace(&mut self) {
        self.input.pop();
        self.on_input_changed();
    }

    fn on_input_changed(&mut self) {
        self.history_cursor = None;
        self.state.set_search_term(&self.input);
        if self.input.trim().is_empty() {
            self.debounce_deadline = None;
        } else {
            self.debounce_deadline = Some(Instant::now() + self.debounce);
        }
    }

    /// Enter: apply the highlighted history entry, or save the current term
    /// to the history.
    pub fn commit_input(&mut self) {
        if let Some(i) = self.history_cursor.take() {
            if let Some(term) = self.search_history.get(i).cloned() {
                self.apply_history_term(&term);
                return;
            }
        }
        let term = self.input.trim().to_string();
        if !term.is_empty() {
            remember_term(&mut self.search_history, &term);
            self.save_session();
        }
    }

    /// Re-run a remembered search.
    fn apply_history_term(&mut self, term: &str) {
        self.input = term.to_string();
        self.debounce_deadline = None;
        self.state.set_search_term(term);
        remember_term(&mut self.search_history, term);
        self.dispatch_search(term);
    }

    /// Whether the history row currently has anything to show.
    pub fn history_visible(&self) -> bool {
        self.show_history && self.input.is_empty() && !self.search_history.is_empty()
    }

    /// Move the history highlight up (towards the most recent term).
    pub fn history_up(&mut self) {
        if !self.history_visible() {
            return;
        }
        self.history_cursor = Some(match self.history_cursor {
            None | Some(0) => 0,
            Some(i) => i - 1,
        });
    }

    /// Move the history highlight down (towards the oldest term).
    pub fn history_down(&mut self) {
        if !self.history_visible() {
            return;
        }
        let last = self.search_history.len() - 1;
        self.history_cursor = Some(match self.history_cursor {
            None => 0,
            Some(i) => (i + 1).min(last),
        });
    }

    /// Esc: drop the search and go back to the full listing, with a fresh
    /// fetch so it is current.
    pub fn clear_search(&mut self) {
        self.input.clear();
        self.history_cursor = None;
        self.debounce_deadline = None;
        self.state.set_search_term("");
        self.last_refresh = Some(Instant::now());
        self.dispatch_fetch();
    }

    /// Flip between dark and light theme and remember the choice.
    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.save_session();
    }

    /// Persist the session whitelist. Failures are non-fatal.
    pub fn save_session(&self) {
        let session = Session::capture(&self.state, self.dark_mode, &self.search_history);
        let _ = self.store.save(&session);
    }

    /// Refresh inline instead of in the background. Batch mode wants the
    /// result before printing, so there is no reason to spawn.
    pub async fn refresh_now(&mut self) {
        self.state.begin_loading();
        if self.state.is_searching() {
            let term = self.state.search_term.trim().to_string();
            let outcome = self.client.search_coins(&term).await;
            self.state.finish_search(outcome.map_err(|e| e.to_string()));
        } else {
            let outcome = self.client.fetch_coins(self.limit).await;
            self.state.finish_fetch(outcome.map_err(|e| e.to_string()));
        }
        self.iteration += 1;
        self.last_refresh = Some(Instant::now());
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Check if max iterations reached.
    pub fn should_quit(&self) -> bool {
        !self.running || (self.max_iterations > 0 && self.iteration >= self.max_iterations)
    }

    /// Get time since last refresh as human readable string.
    pub fn time_since_refresh(&self) -> String {
        match self.last_refresh {
            Some(t) => {
                let elapsed = t.elapsed().as_secs();
                if elapsed < 60 {
                    format!("{}s ago", elapsed)
                } else {
                    format!("{}m ago", elapsed / 60)
                }
            }
            None => "never".to_string(),
        }
    }
}
