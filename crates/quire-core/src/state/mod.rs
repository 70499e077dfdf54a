pub mod confirm;
pub mod dashboard;
pub mod document;
pub mod search;
pub mod session;
pub mod versions;

pub use confirm::Confirmation;
pub use dashboard::DashboardState;
pub use document::{DocumentState, Edit, EditBuffer, EditField, Revision, SaveRequest};
pub use search::{
    is_searchable, SearchInput, SearchState, SearchTicket, MIN_QUERY_CHARS, SEARCH_DEBOUNCE,
};
pub use session::{SessionState, SessionStatus};
pub use versions::{PanelState, VersionPanel};

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::model::User;

/// Everything the editor page tracks for one open document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditorState {
    pub document: DocumentState,
    pub versions: VersionPanel,
    pub collaborator_removal: Confirmation<String>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the removal prompt for a collaborator (owner only)
    pub fn stage_collaborator_removal(
        &mut self,
        user: Option<&User>,
        collaborator_id: impl Into<String>,
    ) -> Result<(), StateError> {
        self.document.require_owner(user)?;
        self.collaborator_removal.stage(collaborator_id.into());
        Ok(())
    }

    /// Open the version delete prompt (owner only)
    pub fn stage_version_delete(
        &mut self,
        user: Option<&User>,
        version_id: impl Into<String>,
    ) -> Result<(), StateError> {
        self.document.require_owner(user)?;
        self.versions.stage_delete(version_id);
        Ok(())
    }

    /// Whether any blocking prompt is showing
    pub fn has_open_prompt(&self) -> bool {
        self.collaborator_removal.is_open() || self.versions.is_confirming_delete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: format!("user{id}"),
            email: format!("{id}@example.com"),
            role: "user".to_string(),
        }
    }

    fn loaded_editor() -> EditorState {
        let mut state = EditorState::new();
        state.document.begin_load();
        state.document.apply_loaded(Document {
            id: "d1".to_string(),
            title: "T".to_string(),
            content: "C".to_string(),
            owner: user("1"),
            collaborators: vec![user("2")],
            created_at: None,
            updated_at: None,
        });
        state
    }

    #[test]
    fn test_editor_state_default() {
        let state = EditorState::default();
        assert_eq!(state, EditorState::new());
        assert!(!state.has_open_prompt());
    }

    #[test]
    fn test_owner_can_stage_prompts() {
        let mut state = loaded_editor();
        let owner = user("1");
        state.stage_collaborator_removal(Some(&owner), "2").unwrap();
        assert_eq!(state.collaborator_removal.pending().map(String::as_str), Some("2"));

        state.stage_version_delete(Some(&owner), "v1").unwrap();
        assert_eq!(state.versions.pending_delete(), Some("v1"));
        assert!(state.has_open_prompt());
    }

    #[test]
    fn test_non_owner_cannot_stage_prompts() {
        let mut state = loaded_editor();
        let other = user("2");
        assert_eq!(
            state.stage_collaborator_removal(Some(&other), "2"),
            Err(StateError::NotOwner)
        );
        assert_eq!(
            state.stage_version_delete(Some(&other), "v1"),
            Err(StateError::NotOwner)
        );
        assert!(!state.has_open_prompt());
    }
}
