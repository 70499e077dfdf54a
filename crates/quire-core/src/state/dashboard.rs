use serde::{Deserialize, Serialize};

use super::confirm::Confirmation;
use crate::model::DocumentSummary;

/// Document list shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardState {
    documents: Vec<DocumentSummary>,
    loading: bool,
    error: Option<String>,
    deletion: Confirmation<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            loading: true,
            error: None,
            deletion: Confirmation::new(),
        }
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn apply_loaded(&mut self, documents: Vec<DocumentSummary>) {
        self.documents = documents;
        self.loading = false;
        self.error = None;
    }

    pub fn apply_load_failed(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Put a newly created document at the top of the list
    pub fn insert(&mut self, document: DocumentSummary) {
        self.documents.retain(|d| d.id != document.id);
        self.documents.insert(0, document);
    }

    pub fn stage_delete(&mut self, document_id: impl Into<String>) {
        self.deletion.stage(document_id.into());
    }

    pub fn take_pending_delete(&mut self) -> Option<String> {
        self.deletion.take()
    }

    pub fn cancel_delete(&mut self) {
        self.deletion.cancel();
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.deletion.is_open()
    }

    pub fn remove(&mut self, document_id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != document_id);
        self.documents.len() != before
    }

    pub fn documents(&self) -> &[DocumentSummary] {
        &self.documents
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
