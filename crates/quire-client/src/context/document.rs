use std::sync::Arc;

use quire_core::{Edit, EditorState, StateError};

use super::session::SessionContext;
use crate::api::DocsApi;
use crate::error::{ActionError, ApiError};
use crate::scope::RequestScope;

const FETCH_FAILED: &str = "Failed to fetch document.";

/// What a save attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The buffer was sent and the server accepted it
    Saved,
    /// Nothing changed since the last server copy, so nothing was sent
    Unchanged,
}

/// State and actions for one open document.
///
/// Every handler goes through the gateway and reconciles the response into
/// [`EditorState`]. Failures from the backend are also reported to the
/// session so an expired login drops the user.
pub struct DocumentContext<A> {
    doc_id: String,
    api: Arc<A>,
    session: SessionContext<A>,
    state: EditorState,
    scope: RequestScope,
}

impl<A: DocsApi> DocumentContext<A> {
    pub fn new(doc_id: impl Into<String>, session: SessionContext<A>) -> Self {
        Self {
            doc_id: doc_id.into(),
            api: Arc::clone(session.api()),
            session,
            state: EditorState::new(),
            scope: RequestScope::new(),
        }
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn session(&self) -> &SessionContext<A> {
        &self.session
    }

    /// Handle that cancels this document's in-flight requests
    pub fn cancel_handle(&self) -> RequestScope {
        self.scope.clone()
    }

    /// Wait for the session check, then fetch the document. Runs once.
    pub async fn initialize(&mut self) {
        self.session.initialize().await;
        if !self.state.document.begin_load() {
            return;
        }
        if self.doc_id.is_empty() {
            self.state.document.apply_load_failed("No document selected.");
            return;
        }

        match self.scope.run(self.api.get_document(&self.doc_id)).await {
            Ok(document) => {
                tracing::info!(doc_id = %self.doc_id, "Document loaded");
                self.state.document.apply_loaded(document);
            }
            Err(err) => {
                tracing::warn!(doc_id = %self.doc_id, "Failed to load document: {}", err);
                self.session.observe(&err).await;
                let message = match &err {
                    ApiError::Transport(_) | ApiError::Decode(_) => FETCH_FAILED.to_string(),
                    other => other.message(),
                };
                self.state.document.apply_load_failed(message);
            }
        }
    }

    /// `None` while the document or the session user is still unknown
    pub async fn is_owner(&self) -> Option<bool> {
        let user = self.session.user().await;
        self.state.document.is_owner(user.as_ref())
    }

    async fn require_owner(&self) -> Result<(), ActionError> {
        let user = self.session.user().await;
        self.state.document.require_owner(user.as_ref())?;
        Ok(())
    }

    async fn fail(&self, action: &str, err: ApiError) -> ActionError {
        tracing::warn!(doc_id = %self.doc_id, action, "Request failed: {}", err);
        self.session.observe(&err).await;
        err.into()
    }

    /// Forward an editor change; returns false when it was made against a replaced buffer
    pub fn apply_edit(&mut self, edit: Edit) -> bool {
        let applied = self.state.document.apply_edit(edit);
        if !applied {
            tracing::debug!(doc_id = %self.doc_id, "Dropped edit made before a server replacement");
        }
        applied
    }

    /// Persist the edit buffer
    pub async fn handle_update(&mut self) -> Result<SaveOutcome, ActionError> {
        let Some(request) = self.state.document.prepare_save()? else {
            return Ok(SaveOutcome::Unchanged);
        };

        let saved = self
            .scope
            .run(
                self.api
                    .update_document(&self.doc_id, &request.title, &request.content),
            )
            .await;
        match saved {
            Ok(document) => {
                if !self.state.document.complete_save(&request, document) {
                    tracing::debug!(doc_id = %self.doc_id, "Save superseded by a newer server copy");
                }
                tracing::info!(doc_id = %self.doc_id, "Document saved");
                Ok(SaveOutcome::Saved)
            }
            Err(err) => Err(self.fail("save", err).await),
        }
    }

    /// Add a collaborator by user id; an empty id does nothing
    pub async fn handle_add_collaborator(&mut self, collaborator_id: &str) -> Result<(), ActionError> {
        if collaborator_id.is_empty() {
            return Ok(());
        }
        self.require_owner().await?;

        let result = self
            .scope
            .run(self.api.add_collaborator(&self.doc_id, collaborator_id))
            .await;
        match result {
            Ok(document) => {
                tracing::info!(doc_id = %self.doc_id, %collaborator_id, "Collaborator added");
                self.state.document.apply_document(document);
                Ok(())
            }
            Err(err) => Err(self.fail("add collaborator", err).await),
        }
    }

    pub async fn handle_remove_collaborator(
        &mut self,
        collaborator_id: &str,
    ) -> Result<(), ActionError> {
        self.require_owner().await?;

        let result = self
            .scope
            .run(self.api.remove_collaborator(&self.doc_id, collaborator_id))
            .await;
        match result {
            Ok(()) => {
                tracing::info!(doc_id = %self.doc_id, %collaborator_id, "Collaborator removed");
                self.state.document.remove_collaborator(collaborator_id);
                Ok(())
            }
            Err(err) => Err(self.fail("remove collaborator", err).await),
        }
    }

    /// Open the removal prompt for a collaborator
    pub async fn request_collaborator_removal(
        &mut self,
        collaborator_id: &str,
    ) -> Result<(), ActionError> {
        let user = self.session.user().await;
        self.state
            .stage_collaborator_removal(user.as_ref(), collaborator_id)?;
        Ok(())
    }

    /// Remove the staged collaborator. The prompt closes whatever the outcome.
    pub async fn confirm_collaborator_removal(&mut self) -> Result<(), ActionError> {
        let collaborator_id = self
            .state
            .collaborator_removal
            .take()
            .ok_or(StateError::NothingPending)?;
        self.handle_remove_collaborator(&collaborator_id).await
    }

    pub fn cancel_collaborator_removal(&mut self) {
        self.state.collaborator_removal.cancel();
    }

    /// Re-read the collaborator list from the backend
    pub async fn refresh_collaborators(&mut self) -> Result<(), ActionError> {
        let result = self
            .scope
            .run(self.api.list_collaborators(&self.doc_id))
            .await;
        match result {
            Ok(collaborators) => {
                self.state.document.set_collaborators(collaborators);
                Ok(())
            }
            Err(err) => Err(self.fail("list collaborators", err).await),
        }
    }

    /// Load the version history and open the panel
    pub async fn handle_fetch_versions(&mut self) -> Result<(), ActionError> {
        let result = self.scope.run(self.api.list_versions(&self.doc_id)).await;
        match result {
            Ok(versions) => {
                tracing::debug!(doc_id = %self.doc_id, count = versions.len(), "Versions loaded");
                self.state.versions.open_with(versions);
                Ok(())
            }
            Err(err) => Err(self.fail("list versions", err).await),
        }
    }

    /// Replace the document with a restored version and close the panel
    pub async fn handle_restore_version(&mut self, version_id: &str) -> Result<(), ActionError> {
        let result = self
            .scope
            .run(self.api.restore_version(&self.doc_id, version_id))
            .await;
        match result {
            Ok(document) => {
                tracing::info!(doc_id = %self.doc_id, %version_id, "Version restored");
                self.state.document.apply_restored(document);
                self.state.versions.close();
                Ok(())
            }
            Err(err) => Err(self.fail("restore version", err).await),
        }
    }

    /// Stage a version for deletion and open the confirmation prompt
    pub async fn handle_delete_version(&mut self, version_id: &str) -> Result<(), ActionError> {
        let user = self.session.user().await;
        self.state.stage_version_delete(user.as_ref(), version_id)?;
        Ok(())
    }

    /// Delete the staged version. The prompt closes whatever the outcome.
    pub async fn confirm_delete(&mut self) -> Result<(), ActionError> {
        let version_id = self
            .state
            .versions
            .take_pending_delete()
            .ok_or(StateError::NothingPending)?;
        self.require_owner().await?;

        let result = self
            .scope
            .run(self.api.delete_version(&self.doc_id, &version_id))
            .await;
        match result {
            Ok(()) => {
                if !self.state.versions.remove(&version_id) {
                    tracing::debug!(doc_id = %self.doc_id, %version_id, "Deleted version was not cached");
                }
                tracing::info!(doc_id = %self.doc_id, %version_id, "Version deleted");
                Ok(())
            }
            Err(err) => Err(self.fail("delete version", err).await),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.state.versions.cancel_delete();
    }

    pub fn handle_close_versions(&mut self) {
        self.state.versions.close();
    }

    /// Cancel requests still in flight for this document
    pub fn teardown(&self) {
        self.scope.cancel();
    }
}

impl<A> Drop for DocumentContext<A> {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
