use quire_core::User;
use serde::Serialize;

use super::HttpGateway;
use crate::error::ApiResult;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

impl HttpGateway {
    /// Log in; the backend answers with the user and sets the session cookie
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let url = self.endpoint(&["auth", "login"])?;
        let request = self.client.post(url).json(&Credentials { email, password });
        self.send(request).await?.field(&["user"])
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let url = self.endpoint(&["auth", "logout"])?;
        self.send(self.client.post(url)).await?.acknowledge("logout");
        Ok(())
    }

    /// Who the session cookie belongs to
    pub async fn current_user(&self) -> ApiResult<User> {
        let url = self.endpoint(&["user", "me"])?;
        self.send(self.client.get(url)).await?.field(&["user"])
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<()> {
        let url = self.endpoint(&["auth", "register"])?;
        let request = self.client.post(url).json(&Registration {
            username,
            email,
            password,
        });
        self.send(request).await?.acknowledge("register");
        Ok(())
    }
}
