use quire_core::{Document, Version};

use super::HttpGateway;
use crate::error::ApiResult;

impl HttpGateway {
    pub async fn list_versions(&self, id: &str) -> ApiResult<Vec<Version>> {
        let url = self.endpoint(&["docs", id, "versions"])?;
        self.send(self.client.get(url)).await?.list(&["versions"])
    }

    /// Roll the document back; the backend answers with the restored document
    pub async fn restore_version(&self, doc_id: &str, version_id: &str) -> ApiResult<Document> {
        let url = self.endpoint(&["docs", doc_id, "versions", version_id, "restore"])?;
        self.send(self.client.put(url))
            .await?
            .field(&["Document", "document"])
    }

    pub async fn delete_version(&self, doc_id: &str, version_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["docs", doc_id, "versions", version_id])?;
        self.send(self.client.delete(url)).await?.acknowledge("delete version");
        Ok(())
    }
}
