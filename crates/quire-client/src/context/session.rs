use std::sync::Arc;

use quire_core::{SessionState, User};
use tokio::sync::{OnceCell, RwLock};

use crate::api::DocsApi;
use crate::error::{ActionError, ApiError};
use crate::scope::RequestScope;

/// Shared handle to the signed-in user.
///
/// Clones share one state; hand a clone to every context that needs the user.
pub struct SessionContext<A> {
    api: Arc<A>,
    state: Arc<RwLock<SessionState>>,
    checked: Arc<OnceCell<()>>,
    scope: RequestScope,
}

impl<A> Clone for SessionContext<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            checked: Arc::clone(&self.checked),
            scope: self.scope.clone(),
        }
    }
}

impl<A: DocsApi> SessionContext<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(SessionState::new())),
            checked: Arc::new(OnceCell::new()),
            scope: RequestScope::new(),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Run the "who am I" check. Only the first call hits the backend; later
    /// and concurrent callers wait for it to settle.
    pub async fn initialize(&self) {
        self.checked.get_or_init(|| self.check_session()).await;
    }

    async fn check_session(&self) {
        if !self.state.write().await.begin_check() {
            return;
        }
        let result = self.scope.run(self.api.current_user()).await;
        let mut state = self.state.write().await;
        match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Session restored");
                state.finish_check(Some(user));
            }
            Err(err) => {
                tracing::debug!("Session check failed: {}", err);
                state.finish_check(None);
            }
        }
    }

    /// Adopt the user from a successful login response without re-fetching
    pub async fn login(&self, user: User) {
        tracing::info!(user_id = %user.id, "Logged in");
        self.state.write().await.login(user);
    }

    /// Log in with credentials and adopt the returned user
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ActionError> {
        let user = self.scope.run(self.api.login(email, password)).await?;
        self.login(user.clone()).await;
        Ok(user)
    }

    /// Create an account. The session stays as it is.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ActionError> {
        self.scope
            .run(self.api.register(username, email, password))
            .await?;
        tracing::info!(%email, "Registered");
        Ok(())
    }

    /// Best-effort backend logout, then always drop the local user
    pub async fn logout(&self) {
        if let Err(err) = self.scope.run(self.api.logout()).await {
            tracing::warn!("Logout request failed: {}", err);
        }
        self.state.write().await.clear();
        tracing::info!("Logged out");
    }

    /// Drop the session when a call reports missing or invalid credentials
    pub async fn observe(&self, err: &ApiError) {
        if err.is_auth_failure() {
            tracing::warn!("Authentication failure, clearing session: {}", err);
            self.state.write().await.clear();
        }
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user().cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Cancel any request still in flight for this session
    pub fn teardown(&self) {
        self.scope.cancel();
    }
}
