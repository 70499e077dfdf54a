use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::User;

/// Inactivity window before a query is sent
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// Queries up to this many characters never reach the backend
pub const MIN_QUERY_CHARS: usize = 2;

/// A query cleared to go out once its debounce timer fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTicket {
    pub token: u64,
    pub query: String,
}

/// What the view should do after a keystroke
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchInput {
    /// Query too short: results were cleared and no call is made
    Cleared,
    /// Start (or restart) the debounce timer for this ticket
    Scheduled(SearchTicket),
}

/// Collaborator lookup state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchState {
    query: String,
    results: Vec<User>,
    latest: u64,
}

/// Whether a query is long enough to search for
pub fn is_searchable(query: &str) -> bool {
    query.chars().count() > MIN_QUERY_CHARS
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keystroke. Every call invalidates earlier tickets.
    pub fn input(&mut self, query: impl Into<String>) -> SearchInput {
        self.query = query.into();
        self.latest += 1;
        if is_searchable(&self.query) {
            SearchInput::Scheduled(SearchTicket {
                token: self.latest,
                query: self.query.clone(),
            })
        } else {
            self.results.clear();
            SearchInput::Cleared
        }
    }

    /// Whether a ticket still matches the last keystroke
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        ticket.token == self.latest
    }

    /// Apply results for a ticket. Results for superseded tickets are dropped.
    pub fn accept(&mut self, ticket: &SearchTicket, results: Vec<User>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.results = results;
        true
    }

    /// Reset after a result was picked
    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.latest += 1;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[User] {
        &self.results
    }
}
