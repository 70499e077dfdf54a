use serde::{Deserialize, Serialize};
use std::fmt;

/// Screens of the front end
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    CreateDocument,
    Document(String),
}

impl Route {
    /// Where to land once the session check has settled
    pub fn landing(authenticated: bool) -> Self {
        if authenticated {
            Route::Dashboard
        } else {
            Route::Login
        }
    }

    /// Whether the screen needs an authenticated session
    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::CreateDocument => "/docs/create".to_string(),
            Route::Document(id) => format!("/docs/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
