use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::model::{Document, User};

/// Monotonic counter bumped every time the server replaces the edit buffer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Revision(u64);

impl Revision {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Which part of the buffer an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditField {
    Title,
    Content,
}

/// A buffer change reported by the editor, tagged with the revision it was made against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub field: EditField,
    pub text: String,
    pub base: Revision,
}

/// Local title/content input buffer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditBuffer {
    pub title: String,
    pub content: String,
    /// Edited since the server last replaced the buffer or accepted a save
    dirty: bool,
}

impl EditBuffer {
    fn replace(&mut self, title: &str, content: &str) {
        self.title = title.to_string();
        self.content = content.to_string();
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Snapshot of the buffer to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub title: String,
    pub content: String,
    pub base: Revision,
}

/// Cached projection of one server document plus its edit buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    document: Option<Document>,
    buffer: EditBuffer,
    revision: Revision,
    load_requested: bool,
    loading: bool,
    error: Option<String>,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentState {
    pub fn new() -> Self {
        Self {
            document: None,
            buffer: EditBuffer::default(),
            revision: Revision::default(),
            load_requested: false,
            loading: true,
            error: None,
        }
    }

    /// Claim the initial fetch. Returns true exactly once.
    pub fn begin_load(&mut self) -> bool {
        if self.load_requested {
            return false;
        }
        self.load_requested = true;
        self.loading = true;
        self.error = None;
        true
    }

    pub fn apply_loaded(&mut self, document: Document) {
        self.replace_from_server(document);
        self.loading = false;
        self.error = None;
    }

    /// Record a failed fetch; the document stays unset
    pub fn apply_load_failed(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Replace document and buffer with a restored server copy
    pub fn apply_restored(&mut self, document: Document) {
        self.replace_from_server(document);
    }

    /// Take a server copy of the document without touching the edit buffer
    pub fn apply_document(&mut self, mut document: Document) {
        document.dedup_collaborators();
        self.document = Some(document);
    }

    fn replace_from_server(&mut self, mut document: Document) {
        document.dedup_collaborators();
        self.buffer.replace(&document.title, &document.content);
        self.revision = self.revision.next();
        self.document = Some(document);
    }

    /// Whether `user` owns the document; `None` while either side is unknown
    pub fn is_owner(&self, user: Option<&User>) -> Option<bool> {
        match (&self.document, user) {
            (Some(document), Some(user)) => Some(document.is_owned_by(user)),
            _ => None,
        }
    }

    pub fn require_owner(&self, user: Option<&User>) -> Result<(), StateError> {
        if self.document.is_none() {
            return Err(StateError::NoDocument);
        }
        match self.is_owner(user) {
            Some(true) => Ok(()),
            _ => Err(StateError::NotOwner),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.buffer.title = title.into();
        self.buffer.dirty = true;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.buffer.content = content.into();
        self.buffer.dirty = true;
    }

    /// Apply an editor change. Changes made against an older revision are dropped.
    pub fn apply_edit(&mut self, edit: Edit) -> bool {
        if edit.base != self.revision {
            return false;
        }
        match edit.field {
            EditField::Title => self.set_title(edit.text),
            EditField::Content => self.set_content(edit.text),
        }
        true
    }

    /// Snapshot the buffer for saving. `None` when there is nothing new to persist.
    pub fn prepare_save(&self) -> Result<Option<SaveRequest>, StateError> {
        if self.document.is_none() {
            return Err(StateError::NoDocument);
        }
        if !self.buffer.dirty {
            return Ok(None);
        }
        Ok(Some(SaveRequest {
            title: self.buffer.title.clone(),
            content: self.buffer.content.clone(),
            base: self.revision,
        }))
    }

    /// Reconcile a finished save. A save based on a stale revision is ignored.
    pub fn complete_save(&mut self, request: &SaveRequest, saved: Option<Document>) -> bool {
        if request.base != self.revision {
            return false;
        }
        if self.buffer.title == request.title && self.buffer.content == request.content {
            self.buffer.dirty = false;
        }
        match saved {
            Some(document) => self.apply_document(document),
            None => {
                if let Some(document) = self.document.as_mut() {
                    document.title = request.title.clone();
                    document.content = request.content.clone();
                }
            }
        }
        true
    }

    pub fn set_collaborators(&mut self, collaborators: Vec<User>) {
        if let Some(document) = self.document.as_mut() {
            document.collaborators = collaborators;
            document.dedup_collaborators();
        }
    }

    /// Drop a collaborator locally, returning whether one was present
    pub fn remove_collaborator(&mut self, user_id: &str) -> bool {
        self.document
            .as_mut()
            .map(|document| document.remove_collaborator(user_id))
            .unwrap_or(false)
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.buffer.title
    }

    pub fn content(&self) -> &str {
        &self.buffer.content
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
