use serde::{Deserialize, Serialize};

use crate::model::User;

/// Authentication status of the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionStatus {
    /// The "who am I" check has not settled yet; the user is unknown
    #[default]
    Checking,
    Authenticated(User),
    Anonymous,
}

/// Session state: current user plus the once-only check guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionState {
    status: SessionStatus,
    check_issued: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the session check. Returns true exactly once per session state.
    pub fn begin_check(&mut self) -> bool {
        if self.check_issued {
            return false;
        }
        self.check_issued = true;
        true
    }

    /// Record the outcome of the session check.
    ///
    /// A login that landed while the check was in flight wins over an
    /// anonymous result.
    pub fn finish_check(&mut self, user: Option<User>) {
        match user {
            Some(user) => self.status = SessionStatus::Authenticated(user),
            None => {
                if self.status == SessionStatus::Checking {
                    self.status = SessionStatus::Anonymous;
                }
            }
        }
    }

    /// Adopt the user returned by a successful login call
    pub fn login(&mut self, user: User) {
        self.check_issued = true;
        self.status = SessionStatus::Authenticated(user);
    }

    /// Forget the current user (logout or authentication failure)
    pub fn clear(&mut self) {
        self.check_issued = true;
        self.status = SessionStatus::Anonymous;
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn user(&self) -> Option<&User> {
        match &self.status {
            SessionStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// True while the user is unknown. Never read this as anonymous.
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Checking
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated(_))
    }
}
