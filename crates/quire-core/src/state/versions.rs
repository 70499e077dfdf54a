use serde::{Deserialize, Serialize};

use super::confirm::Confirmation;
use crate::model::Version;

/// Visibility of the version history panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PanelState {
    #[default]
    Closed,
    Open,
}

/// Cached version history with the panel and the delete prompt layered on top
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionPanel {
    versions: Vec<Version>,
    panel: PanelState,
    deletion: Confirmation<String>,
}

impl VersionPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a freshly fetched history and open the panel
    pub fn open_with(&mut self, versions: Vec<Version>) {
        self.versions = versions;
        self.panel = PanelState::Open;
    }

    pub fn close(&mut self) {
        self.panel = PanelState::Closed;
    }

    pub fn is_open(&self) -> bool {
        self.panel == PanelState::Open
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn get(&self, version_id: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    /// Stage a version for deletion and open the confirmation prompt
    pub fn stage_delete(&mut self, version_id: impl Into<String>) {
        self.deletion.stage(version_id.into());
    }

    /// Close the prompt and return the staged id
    pub fn take_pending_delete(&mut self) -> Option<String> {
        self.deletion.take()
    }

    pub fn cancel_delete(&mut self) {
        self.deletion.cancel();
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.deletion.is_open()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.deletion.pending().map(String::as_str)
    }

    /// Drop a version from the cached history; unknown ids leave it unchanged
    pub fn remove(&mut self, version_id: &str) -> bool {
        let before = self.versions.len();
        self.versions.retain(|v| v.id != version_id);
        self.versions.len() != before
    }
}
