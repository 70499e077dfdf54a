use std::sync::Arc;
use std::time::Duration;

use quire_core::{SearchInput, SearchState, SearchTicket, User};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::session::SessionContext;
use crate::api::DocsApi;

/// Debounced user lookup for the add-collaborator box.
///
/// Each keystroke restarts a single timer. When it fires, the query goes out
/// as a detached request, so a later keystroke only cancels the timer and
/// never a request already on the wire. Responses for superseded keystrokes
/// are dropped. An authentication failure is reported to the session.
pub struct CollaboratorSearch<A> {
    session: SessionContext<A>,
    state: Arc<Mutex<SearchState>>,
    debounce: Duration,
    timer: Option<JoinHandle<()>>,
}

impl<A: DocsApi + 'static> CollaboratorSearch<A> {
    pub fn new(session: SessionContext<A>, debounce: Duration) -> Self {
        Self {
            session,
            state: Arc::new(Mutex::new(SearchState::new())),
            debounce,
            timer: None,
        }
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Record a keystroke
    pub async fn input(&mut self, query: &str) {
        let input = self.state.lock().await.input(query);
        self.stop_timer();

        let SearchInput::Scheduled(ticket) = input else {
            return;
        };
        let session = self.session.clone();
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let request = tokio::spawn(search(session, state, ticket));
            if let Err(err) = request.await {
                tracing::error!("Search task failed: {}", err);
            }
        }));
    }

    /// Wait for the pending timer, and the request it starts, to finish
    pub async fn settle(&mut self) {
        if let Some(timer) = self.timer.take() {
            // An aborted timer has nothing left to wait for
            let _ = timer.await;
        }
    }

    pub async fn results(&self) -> Vec<User> {
        self.state.lock().await.results().to_vec()
    }

    pub async fn query(&self) -> String {
        self.state.lock().await.query().to_string()
    }

    /// Reset after a user was picked; late responses are discarded
    pub async fn clear(&mut self) {
        self.stop_timer();
        self.state.lock().await.clear();
    }
}

impl<A> Drop for CollaboratorSearch<A> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

async fn search<A: DocsApi>(
    session: SessionContext<A>,
    state: Arc<Mutex<SearchState>>,
    ticket: SearchTicket,
) {
    if !state.lock().await.is_current(&ticket) {
        return;
    }
    let results = match session.api().search_users(&ticket.query).await {
        Ok(users) => users,
        Err(err) => {
            tracing::warn!(query = %ticket.query, "User search failed: {}", err);
            session.observe(&err).await;
            Vec::new()
        }
    };
    if !state.lock().await.accept(&ticket, results) {
        tracing::debug!(token = ticket.token, "Dropped stale search results");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDocsApi;
    use crate::error::ApiError;
    use crate::testing::{user, FakeApi};
    use quire_core::SEARCH_DEBOUNCE;

    fn directory() -> Arc<FakeApi> {
        let api = Arc::new(FakeApi::new());
        api.with(|b| b.directory.extend([user("1"), user("2"), user("3")]));
        api
    }

    fn searcher<A: DocsApi + 'static>(api: Arc<A>) -> CollaboratorSearch<A> {
        CollaboratorSearch::new(SessionContext::new(api), SEARCH_DEBOUNCE)
    }

    fn ids(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.id.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_fires_after_quiet_period() {
        let api = directory();
        let mut search = searcher(Arc::clone(&api));

        search.input("example").await;
        tokio::time::sleep(Duration::from_millis(399)).await;
        assert_eq!(api.count("search_users"), 0);

        search.settle().await;
        assert_eq!(api.count("search_users"), 1);
        assert_eq!(ids(&search.results().await), ["1", "2", "3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_issues_one_call() {
        let mut mock = MockDocsApi::new();
        mock.expect_search_users()
            .withf(|query| query == "2@exa")
            .times(1)
            .returning(|_| Ok(vec![user("2")]));
        let mut search = searcher(Arc::new(mock));

        for query in ["2", "2@", "2@e", "2@ex", "2@exa"] {
            search.input(query).await;
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        search.settle().await;

        assert_eq!(search.query().await, "2@exa");
        assert_eq!(ids(&search.results().await), ["2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears_without_call() {
        let mut mock = MockDocsApi::new();
        mock.expect_search_users().times(1).returning(|_| Ok(vec![user("1")]));
        let mut search = searcher(Arc::new(mock));

        search.input("abc").await;
        search.settle().await;
        assert_eq!(search.results().await.len(), 1);

        search.input("ab").await;
        assert!(search.results().await.is_empty());
        tokio::time::sleep(Duration::from_secs(1)).await;
        search.settle().await;
        assert!(search.results().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_dropped() {
        let api = directory();
        api.with(|b| b.latency = Some(Duration::from_secs(2)));
        let mut search = searcher(Arc::clone(&api));

        search.input("1@e").await;
        // Timer has fired; the first request is now in flight
        tokio::time::sleep(Duration::from_millis(450)).await;
        api.with(|b| b.latency = None);
        search.input("2@e").await;
        search.settle().await;
        assert_eq!(ids(&search.results().await), ["2"]);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(api.count("search_users"), 2);
        assert_eq!(ids(&search.results().await), ["2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_search_yields_no_results() {
        let mut mock = MockDocsApi::new();
        mock.expect_search_users()
            .times(1)
            .returning(|_| Err(ApiError::Rejected("Search failed".to_string())));
        let mut search = searcher(Arc::new(mock));

        search.input("anna").await;
        search.settle().await;
        assert!(search.results().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_login_during_search_clears_session() {
        let mut mock = MockDocsApi::new();
        mock.expect_search_users()
            .times(1)
            .returning(|_| Err(ApiError::Unauthorized("Invalid Token".to_string())));
        let session = SessionContext::new(Arc::new(mock));
        session.login(user("1")).await;
        let mut search = CollaboratorSearch::new(session.clone(), SEARCH_DEBOUNCE);

        search.input("anna").await;
        search.settle().await;

        assert!(search.results().await.is_empty());
        assert_eq!(session.user().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_search_keeps_session() {
        let mut mock = MockDocsApi::new();
        mock.expect_search_users()
            .times(1)
            .returning(|_| Err(ApiError::Rejected("Search failed".to_string())));
        let session = SessionContext::new(Arc::new(mock));
        session.login(user("1")).await;
        let mut search = CollaboratorSearch::new(session.clone(), SEARCH_DEBOUNCE);

        search.input("anna").await;
        search.settle().await;

        assert_eq!(session.user().await, Some(user("1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_discards_pending_timer() {
        let api = directory();
        let mut search = searcher(Arc::clone(&api));
        search.input("example").await;
        search.clear().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(api.count("search_users"), 0);
        assert_eq!(search.query().await, "");
    }
}
