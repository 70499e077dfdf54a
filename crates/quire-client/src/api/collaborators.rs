use quire_core::{Document, User};
use serde::Serialize;

use super::HttpGateway;
use crate::error::ApiResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollaboratorBody<'a> {
    collaborator_id: &'a str,
}

impl HttpGateway {
    pub async fn list_collaborators(&self, id: &str) -> ApiResult<Vec<User>> {
        let url = self.endpoint(&["docs", id, "collaborators"])?;
        self.send(self.client.get(url))
            .await?
            .list(&["collaborators", "Collaborators"])
    }

    /// Grant access; the backend answers with the updated document
    pub async fn add_collaborator(&self, id: &str, collaborator_id: &str) -> ApiResult<Document> {
        let url = self.endpoint(&["docs", id, "add-collaborator"])?;
        let request = self.client.post(url).json(&CollaboratorBody { collaborator_id });
        self.send(request).await?.field(&["Document", "document"])
    }

    pub async fn remove_collaborator(&self, id: &str, collaborator_id: &str) -> ApiResult<()> {
        // The backend route really is spelled with a capital C
        let url = self.endpoint(&["docs", id, "remove-Collaborator"])?;
        let request = self
            .client
            .delete(url)
            .json(&CollaboratorBody { collaborator_id });
        self.send(request).await?.acknowledge("remove collaborator");
        Ok(())
    }
}
