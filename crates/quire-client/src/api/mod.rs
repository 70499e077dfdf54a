mod auth;
mod collaborators;
mod documents;
mod envelope;
mod users;
mod versions;

use async_trait::async_trait;
use quire_core::{Document, DocumentSummary, User, Version};
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use envelope::Envelope;

/// One call per backend operation, each returning a normalized result
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocsApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ApiResult<User>;
    async fn logout(&self) -> ApiResult<()>;
    async fn current_user(&self) -> ApiResult<User>;
    async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<()>;

    async fn list_documents(&self) -> ApiResult<Vec<DocumentSummary>>;
    async fn create_document(&self, title: &str, content: &str) -> ApiResult<Document>;
    async fn get_document(&self, id: &str) -> ApiResult<Document>;
    /// Returns the updated document when the server echoes it back
    async fn update_document(
        &self,
        id: &str,
        title: &str,
        content: &str,
    ) -> ApiResult<Option<Document>>;
    async fn delete_document(&self, id: &str) -> ApiResult<()>;

    async fn list_collaborators(&self, id: &str) -> ApiResult<Vec<User>>;
    async fn add_collaborator(&self, id: &str, collaborator_id: &str) -> ApiResult<Document>;
    async fn remove_collaborator(&self, id: &str, collaborator_id: &str) -> ApiResult<()>;

    async fn list_versions(&self, id: &str) -> ApiResult<Vec<Version>>;
    async fn restore_version(&self, doc_id: &str, version_id: &str) -> ApiResult<Document>;
    async fn delete_version(&self, doc_id: &str, version_id: &str) -> ApiResult<()>;

    async fn search_users(&self, query: &str) -> ApiResult<Vec<User>>;
}

/// Reqwest-backed gateway. Cookies set by the backend are replayed on every call.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL extended with percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Envelope> {
        let request = request.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.client.execute(request).await.map_err(|err| {
            tracing::warn!(%method, %path, "Request failed: {}", err);
            ApiError::from(err)
        })?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(%method, %path, %status, bytes = body.len(), "Backend responded");

        Envelope::parse(status, &body)
    }
}

#[async_trait]
impl DocsApi for HttpGateway {
    async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        HttpGateway::login(self, email, password).await
    }

    async fn logout(&self) -> ApiResult<()> {
        HttpGateway::logout(self).await
    }

    async fn current_user(&self) -> ApiResult<User> {
        HttpGateway::current_user(self).await
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<()> {
        HttpGateway::register(self, username, email, password).await
    }

    async fn list_documents(&self) -> ApiResult<Vec<DocumentSummary>> {
        HttpGateway::list_documents(self).await
    }

    async fn create_document(&self, title: &str, content: &str) -> ApiResult<Document> {
        HttpGateway::create_document(self, title, content).await
    }

    async fn get_document(&self, id: &str) -> ApiResult<Document> {
        HttpGateway::get_document(self, id).await
    }

    async fn update_document(
        &self,
        id: &str,
        title: &str,
        content: &str,
    ) -> ApiResult<Option<Document>> {
        HttpGateway::update_document(self, id, title, content).await
    }

    async fn delete_document(&self, id: &str) -> ApiResult<()> {
        HttpGateway::delete_document(self, id).await
    }

    async fn list_collaborators(&self, id: &str) -> ApiResult<Vec<User>> {
        HttpGateway::list_collaborators(self, id).await
    }

    async fn add_collaborator(&self, id: &str, collaborator_id: &str) -> ApiResult<Document> {
        HttpGateway::add_collaborator(self, id, collaborator_id).await
    }

    async fn remove_collaborator(&self, id: &str, collaborator_id: &str) -> ApiResult<()> {
        HttpGateway::remove_collaborator(self, id, collaborator_id).await
    }

    async fn list_versions(&self, id: &str) -> ApiResult<Vec<Version>> {
        HttpGateway::list_versions(self, id).await
    }

    async fn restore_version(&self, doc_id: &str, version_id: &str) -> ApiResult<Document> {
        HttpGateway::restore_version(self, doc_id, version_id).await
    }

    async fn delete_version(&self, doc_id: &str, version_id: &str) -> ApiResult<()> {
        HttpGateway::delete_version(self, doc_id, version_id).await
    }

    async fn search_users(&self, query: &str) -> ApiResult<Vec<User>> {
        HttpGateway::search_users(self, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_api_url;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(&Config::new(parse_api_url(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let gw = gateway("http://localhost:5000");
        let url = gw.endpoint(&["docs", "d1", "versions"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/docs/d1/versions");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let gw = gateway("https://example.com/api/");
        let url = gw.endpoint(&["auth", "login"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/auth/login");
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let gw = gateway("http://localhost:5000");
        let url = gw.endpoint(&["docs", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/docs/a%2Fb%20c");
    }
}
