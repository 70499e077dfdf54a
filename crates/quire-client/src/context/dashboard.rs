use std::sync::Arc;

use quire_core::{DashboardState, Document, DocumentSummary, StateError};

use super::session::SessionContext;
use crate::api::DocsApi;
use crate::error::{ActionError, ApiError};
use crate::scope::RequestScope;

/// Document list for the signed-in user
pub struct DashboardContext<A> {
    api: Arc<A>,
    session: SessionContext<A>,
    state: DashboardState,
    scope: RequestScope,
}

impl<A: DocsApi> DashboardContext<A> {
    pub fn new(session: SessionContext<A>) -> Self {
        Self {
            api: Arc::clone(session.api()),
            session,
            state: DashboardState::new(),
            scope: RequestScope::new(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    async fn fail(&self, action: &str, err: ApiError) -> ActionError {
        tracing::warn!(action, "Request failed: {}", err);
        self.session.observe(&err).await;
        err.into()
    }

    /// Fetch every document the user owns or collaborates on
    pub async fn load(&mut self) {
        self.state.begin_load();
        match self.scope.run(self.api.list_documents()).await {
            Ok(documents) => {
                tracing::debug!(count = documents.len(), "Documents loaded");
                self.state.apply_loaded(documents);
            }
            Err(err) => {
                let message = match &err {
                    ApiError::Transport(_) | ApiError::Decode(_) => {
                        "Failed to fetch documents.".to_string()
                    }
                    other => other.message(),
                };
                // Auth failures clear the session; the view routes to login
                self.fail("list documents", err).await;
                self.state.apply_load_failed(message);
            }
        }
    }

    pub async fn create_document(
        &mut self,
        title: &str,
        content: &str,
    ) -> Result<Document, ActionError> {
        match self.scope.run(self.api.create_document(title, content)).await {
            Ok(document) => {
                tracing::info!(doc_id = %document.id, "Document created");
                self.state.insert(DocumentSummary::from(document.clone()));
                Ok(document)
            }
            Err(err) => Err(self.fail("create document", err).await),
        }
    }

    pub fn request_delete(&mut self, document_id: &str) {
        self.state.stage_delete(document_id);
    }

    /// Delete the staged document. The prompt closes whatever the outcome.
    pub async fn confirm_delete(&mut self) -> Result<(), ActionError> {
        let document_id = self
            .state
            .take_pending_delete()
            .ok_or(StateError::NothingPending)?;
        match self.scope.run(self.api.delete_document(&document_id)).await {
            Ok(()) => {
                tracing::info!(doc_id = %document_id, "Document deleted");
                self.state.remove(&document_id);
                Ok(())
            }
            Err(err) => Err(self.fail("delete document", err).await),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.state.cancel_delete();
    }

    pub async fn logout(&mut self) {
        self.session.logout().await;
    }

    pub fn teardown(&self) {
        self.scope.cancel();
    }
}

impl<A> Drop for DashboardContext<A> {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
