//! Synchronized view state.
//!
//! A single explicitly-owned container for the last API results. It performs
//! no I/O itself; the app dispatches fetches and searches, and whichever
//! outcome settles last is the one that sticks (a race the design accepts
//! instead of sequencing away).

use crate::models::Coin;
use serde::{Deserialize, Serialize};

/// Lifecycle of the most recent fetch or search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// Nothing dispatched yet
    #[default]
    Idle,
    /// A fetch or search is in flight
    Loading,
    /// The last settled operation completed
    Succeeded,
    /// The last settled operation failed
    Failed,
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Idle => write!(f, "idle"),
            LoadStatus::Loading => write!(f, "loading"),
            LoadStatus::Succeeded => write!(f, "ok"),
            LoadStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The view state the UI renders from.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Last successful unfiltered fetch, in API order
    pub coins: Vec<Coin>,
    /// What is currently displayed: `coins` when no search term is active,
    /// otherwise the last settled search result
    pub filtered_coins: Vec<Coin>,
    /// Current text query, possibly empty
    pub search_term: String,
    /// Status of the most recently settled (or in-flight) operation
    pub status: LoadStatus,
    /// Human-readable failure reason, cleared on any success
    pub error: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a search term is active (non-blank).
    pub fn is_searching(&self) -> bool {
        !self.search_term.trim().is_empty()
    }

    /// Mark a fetch or search as dispatched.
    pub fn begin_loading(&mut self) {
        self.status = LoadStatus::Loading;
    }

    /// Record the outcome of a full-listing fetch.
    ///
    /// On success the full list is replaced; the displayed list follows only
    /// when no search term is active, so a fresh listing never stomps on
    /// search results the user is looking at. On failure both lists are left
    /// alone — a stale listing still beats a blank screen.
    pub fn finish_fetch(&mut self, outcome: Result<Vec<Coin>, String>) {
        match outcome {
            Ok(coins) => {
                self.status = LoadStatus::Succeeded;
                if !self.is_searching() {
                    self.filtered_coins = coins.clone();
                }
                self.coins = coins;
                self.error = None;
            }
            Err(reason) => {
                self.status = LoadStatus::Failed;
                self.error = Some(reason);
            }
        }
    }

    /// Record the outcome of a search.
    ///
    /// On success the displayed list is replaced, even with an empty result —
    /// no matches is an answer, not an error. On failure the displayed list
    /// is cleared: a stale, possibly-irrelevant search result is worth less
    /// than showing nothing.
    pub fn finish_search(&mut self, outcome: Result<Vec<Coin>, String>) {
        match outcome {
            Ok(coins) => {
                self.status = LoadStatus::Succeeded;
                self.filtered_coins = coins;
                self.error = None;
            }
            Err(reason) => {
                self.status = LoadStatus::Failed;
                self.filtered_coins = Vec::new();
                self.error = Some(reason);
            }
        }
    }

    /// Update the search term without any network round trip.
    ///
    /// Blanking the term is the one path that restores the full listing to
    /// the display (and clears any error) without dispatching anything.
    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
        if !self.is_searching() {
            self.filtered_coins = self.coins.clone();
            self.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(uuid: &str, price: &str) -> Coin {
        Coin {
            uuid: uuid.to_string(),
            name: format!("{}-name", uuid),
            symbol: uuid.to_uppercase(),
            price: price.to_string(),
            ..Coin::default()
        }
    }

    #[test]
    fn test_initial_state() {
        let state = ViewState::new();
        assert_eq!(state.status, LoadStatus::Idle);
        assert!(state.coins.is_empty());
        assert!(state.filtered_coins.is_empty());
        assert!(state.error.is_none());
        assert!(!state.is_searching());
    }

    #[test]
    fn test_fetch_success_fills_both_lists() {
        let mut state = ViewState::new();
        state.begin_loading();
        assert_eq!(state.status, LoadStatus::Loading);

        let record = coin("a", "10.5");
        state.finish_fetch(Ok(vec![record.clone()]));

        assert_eq!(state.status, LoadStatus::Succeeded);
        assert_eq!(state.coins, vec![record.clone()]);
        assert_eq!(state.filtered_coins, vec![record]);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_fetch_success_during_search_leaves_display_alone() {
        let mut state = ViewState::new();
        let search_hit = coin("hit", "1");
        state.finish_search(Ok(vec![search_hit.clone()]));
        state.set_search_term("bit");

        state.begin_loading();
        state.finish_fetch(Ok(vec![coin("a", "2"), coin("b", "3")]));

        assert_eq!(state.status, LoadStatus::Succeeded);
        assert_eq!(state.coins.len(), 2);
        assert_eq!(state.filtered_coins, vec![search_hit]);
    }

    #[test]
    fn test_fetch_failure_preserves_lists() {
        let mut state = ViewState::new();
        state.finish_fetch(Ok(vec![coin("a", "1")]));

        state.begin_loading();
        state.finish_fetch(Err("rate limited".to_string()));

        assert_eq!(state.status, LoadStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("rate limited"));
        assert_eq!(state.coins.len(), 1);
        assert_eq!(state.filtered_coins.len(), 1);
    }

    #[test]
    fn test_search_success_replaces_display_only() {
        let mut state = ViewState::new();
        state.finish_fetch(Ok(vec![coin("a", "1"), coin("b", "2")]));

        state.set_search_term("eth");
        state.begin_loading();
        state.finish_search(Ok(vec![coin("eth", "3")]));

        assert_eq!(state.status, LoadStatus::Succeeded);
        assert_eq!(state.coins.len(), 2);
        assert_eq!(state.filtered_coins.len(), 1);
        assert_eq!(state.filtered_coins[0].uuid, "eth");
    }

    #[test]
    fn test_search_success_with_empty_result_is_not_an_error() {
        let mut state = ViewState::new();
        state.finish_fetch(Ok(vec![coin("a", "1")]));
        state.set_search_term("xyz");

        state.begin_loading();
        state.finish_search(Ok(Vec::new()));

        assert_eq!(state.status, LoadStatus::Succeeded);
        assert!(state.filtered_coins.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_search_failure_always_empties_display() {
        let mut state = ViewState::new();
        state.finish_fetch(Ok(vec![coin("a", "1"), coin("b", "2")]));
        state.set_search_term("bit");
        state.finish_search(Ok(vec![coin("bit", "3")]));

        state.begin_loading();
        state.finish_search(Err("suggestion endpoint down".to_string()));

        assert_eq!(state.status, LoadStatus::Failed);
        assert!(state.filtered_coins.is_empty());
        assert_eq!(state.error.as_deref(), Some("suggestion endpoint down"));
        // The full listing survives for the next blank-term reset.
        assert_eq!(state.coins.len(), 2);
    }

    #[test]
    fn test_blank_term_restores_full_listing_exactly() {
        let mut state = ViewState::new();
        let all = vec![coin("a", "1"), coin("b", "2"), coin("c", "3")];
        state.finish_fetch(Ok(all.clone()));

        state.set_search_term("b");
        state.finish_search(Err("boom".to_string()));
        assert!(state.filtered_coins.is_empty());
        assert!(state.error.is_some());

        state.set_search_term("");
        assert_eq!(state.filtered_coins, all);
        assert!(state.error.is_none());

        // Whitespace-only counts as blank too.
        state.set_search_term("b");
        state.finish_search(Ok(Vec::new()));
        state.set_search_term("   ");
        assert_eq!(state.filtered_coins, all);
    }

    #[test]
    fn test_set_search_term_changes_no_status() {
        let mut state = ViewState::new();
        state.set_search_term("doge");
        assert_eq!(state.status, LoadStatus::Idle);
        assert_eq!(state.search_term, "doge");
        assert!(state.is_searching());
    }

    #[test]
    fn test_terminal_states_accept_new_dispatch() {
        let mut state = ViewState::new();
        state.finish_fetch(Err("down".to_string()));
        assert_eq!(state.status, LoadStatus::Failed);

        state.begin_loading();
        assert_eq!(state.status, LoadStatus::Loading);

        state.finish_fetch(Ok(vec![coin("a", "1")]));
        assert_eq!(state.status, LoadStatus::Succeeded);

        state.begin_loading();
        assert_eq!(state.status, LoadStatus::Loading);
    }

    #[test]
    fn test_last_writer_wins_between_fetch_and_search() {
        // A search settles first, then a slower fetch settles with the term
        // still active: the fetch updates `coins` but the search result stays
        // on screen. If the term was blanked in between, the fetch wins the
        // display. Whichever settles last decides, field by field.
        let mut state = ViewState::new();
        state.set_search_term("bit");
        state.begin_loading();
        state.begin_loading(); // second dispatch while first is in flight

        state.finish_search(Ok(vec![coin("bit", "9")]));
        state.finish_fetch(Ok(vec![coin("a", "1")]));

        assert_eq!(state.filtered_coins[0].uuid, "bit");
        assert_eq!(state.coins[0].uuid, "a");
        assert_eq!(state.status, LoadStatus::Succeeded);
    }
}
