use quire_core::{Document, DocumentSummary};
use serde::Serialize;

use super::HttpGateway;
use crate::error::ApiResult;

const DOCUMENT_KEYS: [&str; 2] = ["document", "Document"];

#[derive(Debug, Serialize)]
struct DocumentBody<'a> {
    title: &'a str,
    content: &'a str,
}

impl HttpGateway {
    /// Documents the current user owns or collaborates on
    pub async fn list_documents(&self) -> ApiResult<Vec<DocumentSummary>> {
        let url = self.endpoint(&["docs", "all"])?;
        self.send(self.client.get(url))
            .await?
            .list(&["documents", "Documents"])
    }

    pub async fn create_document(&self, title: &str, content: &str) -> ApiResult<Document> {
        let url = self.endpoint(&["docs", "create"])?;
        let request = self.client.post(url).json(&DocumentBody { title, content });
        self.send(request).await?.field(&DOCUMENT_KEYS)
    }

    pub async fn get_document(&self, id: &str) -> ApiResult<Document> {
        let url = self.endpoint(&["docs", id])?;
        self.send(self.client.get(url)).await?.field(&DOCUMENT_KEYS)
    }

    pub async fn update_document(
        &self,
        id: &str,
        title: &str,
        content: &str,
    ) -> ApiResult<Option<Document>> {
        let url = self.endpoint(&["docs", "update", id])?;
        let request = self.client.put(url).json(&DocumentBody { title, content });
        self.send(request).await?.optional_field(&DOCUMENT_KEYS)
    }

    pub async fn delete_document(&self, id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["docs", "delete", id])?;
        self.send(self.client.delete(url)).await?.acknowledge("delete document");
        Ok(())
    }
}
