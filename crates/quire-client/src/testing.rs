//! In-memory backend used by the context tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use quire_core::{Document, DocumentSummary, User, UserRef, Version};

use crate::api::DocsApi;
use crate::error::{ApiError, ApiResult};

pub(crate) fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        username: format!("user{id}"),
        email: format!("{id}@example.com"),
        role: "user".to_string(),
    }
}

pub(crate) fn document(id: &str, owner: &str) -> Document {
    Document {
        id: id.to_string(),
        title: format!("Document {id}"),
        content: format!("<p>content of {id}</p>"),
        owner: user(owner),
        collaborators: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn version(id: &str, title: &str, content: &str) -> Version {
    Version {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        edited_at: None,
        edited_by: UserRef::Id("1".to_string()),
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    pub accounts: Vec<(User, String)>,
    pub session: Option<User>,
    pub documents: Vec<Document>,
    pub versions: HashMap<String, Vec<Version>>,
    pub directory: Vec<User>,
    pub fail_logout: bool,
    /// Artificial latency applied to every call
    pub latency: Option<Duration>,
    calls: Vec<String>,
}

impl FakeBackend {
    fn signed_in(&self) -> ApiResult<User> {
        self.session
            .clone()
            .ok_or_else(|| ApiError::Unauthorized("No Token Provided".to_string()))
    }

    fn document_mut(&mut self, id: &str) -> ApiResult<&mut Document> {
        self.documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))
    }

    fn owned_document_mut(&mut self, id: &str) -> ApiResult<&mut Document> {
        let me = self.signed_in()?;
        let doc = self.document_mut(id)?;
        if doc.owner.id != me.id {
            return Err(ApiError::Rejected(
                "Only the owner can perform this action".to_string(),
            ));
        }
        Ok(doc)
    }
}

pub(crate) struct FakeApi {
    backend: Mutex<FakeBackend>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            backend: Mutex::new(FakeBackend::default()),
        }
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut FakeBackend) -> R) -> R {
        let mut backend = self.backend.lock().unwrap();
        f(&mut backend)
    }

    pub(crate) fn add_account(&self, account: User, password: &str) {
        self.with(|b| {
            b.directory.push(account.clone());
            b.accounts.push((account, password.to_string()));
        });
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.with(|b| b.calls.iter().filter(|c| c.as_str() == call).count())
    }

    async fn enter(&self, call: &str) {
        let latency = self.with(|b| {
            b.calls.push(call.to_string());
            b.latency
        });
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl DocsApi for FakeApi {
    async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        self.enter("login").await;
        self.with(|b| {
            let account = b
                .accounts
                .iter()
                .find(|(u, p)| u.email == email && p == password)
                .map(|(u, _)| u.clone())
                .ok_or_else(|| ApiError::Rejected("Invalid credentials".to_string()))?;
            b.session = Some(account.clone());
            Ok(account)
        })
    }

    async fn logout(&self) -> ApiResult<()> {
        self.enter("logout").await;
        self.with(|b| {
            if b.fail_logout {
                return Err(ApiError::Rejected("Logout failed".to_string()));
            }
            b.session = None;
            Ok(())
        })
    }

    async fn current_user(&self) -> ApiResult<User> {
        self.enter("current_user").await;
        self.with(|b| b.signed_in())
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<()> {
        self.enter("register").await;
        self.with(|b| {
            if b.accounts.iter().any(|(u, _)| u.email == email) {
                return Err(ApiError::Rejected("User already exists".to_string()));
            }
            let account = User {
                id: format!("u{}", b.accounts.len() + 1),
                username: username.to_string(),
                email: email.to_string(),
                role: "user".to_string(),
            };
            b.directory.push(account.clone());
            b.accounts.push((account, password.to_string()));
            Ok(())
        })
    }

    async fn list_documents(&self) -> ApiResult<Vec<DocumentSummary>> {
        self.enter("list_documents").await;
        self.with(|b| {
            let me = b.signed_in()?;
            Ok(b.documents
                .iter()
                .filter(|d| d.owner.id == me.id || d.has_collaborator(&me.id))
                .cloned()
                .map(DocumentSummary::from)
                .collect())
        })
    }

    async fn create_document(&self, title: &str, content: &str) -> ApiResult<Document> {
        self.enter("create_document").await;
        self.with(|b| {
            let me = b.signed_in()?;
            let doc = Document {
                id: format!("d{}", b.documents.len() + 1),
                title: title.to_string(),
                content: content.to_string(),
                owner: me,
                collaborators: Vec::new(),
                created_at: None,
                updated_at: None,
            };
            b.documents.push(doc.clone());
            Ok(doc)
        })
    }

    async fn get_document(&self, id: &str) -> ApiResult<Document> {
        self.enter("get_document").await;
        self.with(|b| {
            b.signed_in()?;
            b.document_mut(id).map(|d| d.clone())
        })
    }

    async fn update_document(
        &self,
        id: &str,
        title: &str,
        content: &str,
    ) -> ApiResult<Option<Document>> {
        self.enter("update_document").await;
        self.with(|b| {
            let me = b.signed_in()?;
            let doc = b.document_mut(id)?;
            let snapshot = Version {
                id: format!("v-{}-{}", doc.id, title.len() + content.len()),
                title: doc.title.clone(),
                content: doc.content.clone(),
                edited_at: None,
                edited_by: UserRef::Resolved(me),
            };
            doc.title = title.to_string();
            doc.content = content.to_string();
            let updated = doc.clone();
            b.versions.entry(id.to_string()).or_default().push(snapshot);
            Ok(Some(updated))
        })
    }

    async fn delete_document(&self, id: &str) -> ApiResult<()> {
        self.enter("delete_document").await;
        self.with(|b| {
            b.owned_document_mut(id)?;
            b.documents.retain(|d| d.id != id);
            Ok(())
        })
    }

    async fn list_collaborators(&self, id: &str) -> ApiResult<Vec<User>> {
        self.enter("list_collaborators").await;
        self.with(|b| b.document_mut(id).map(|d| d.collaborators.clone()))
    }

    async fn add_collaborator(&self, id: &str, collaborator_id: &str) -> ApiResult<Document> {
        self.enter("add_collaborator").await;
        self.with(|b| {
            let collaborator = b
                .directory
                .iter()
                .find(|u| u.id == collaborator_id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
            let doc = b.owned_document_mut(id)?;
            if !doc.has_collaborator(collaborator_id) {
                doc.collaborators.push(collaborator);
            }
            Ok(doc.clone())
        })
    }

    async fn remove_collaborator(&self, id: &str, collaborator_id: &str) -> ApiResult<()> {
        self.enter("remove_collaborator").await;
        self.with(|b| {
            let doc = b.owned_document_mut(id)?;
            doc.remove_collaborator(collaborator_id);
            Ok(())
        })
    }

    async fn list_versions(&self, id: &str) -> ApiResult<Vec<Version>> {
        self.enter("list_versions").await;
        self.with(|b| {
            b.document_mut(id)?;
            Ok(b.versions.get(id).cloned().unwrap_or_default())
        })
    }

    async fn restore_version(&self, doc_id: &str, version_id: &str) -> ApiResult<Document> {
        self.enter("restore_version").await;
        self.with(|b| {
            let version = b
                .versions
                .get(doc_id)
                .and_then(|vs| vs.iter().find(|v| v.id == version_id))
                .cloned()
                .ok_or_else(|| ApiError::NotFound("Version not found".to_string()))?;
            let doc = b.document_mut(doc_id)?;
            doc.title = version.title;
            doc.content = version.content;
            Ok(doc.clone())
        })
    }

    async fn delete_version(&self, doc_id: &str, version_id: &str) -> ApiResult<()> {
        self.enter("delete_version").await;
        self.with(|b| {
            b.owned_document_mut(doc_id)?;
            if let Some(versions) = b.versions.get_mut(doc_id) {
                versions.retain(|v| v.id != version_id);
            }
            Ok(())
        })
    }

    async fn search_users(&self, query: &str) -> ApiResult<Vec<User>> {
        self.enter("search_users").await;
        self.with(|b| {
            Ok(b.directory
                .iter()
                .filter(|u| u.email.contains(query))
                .cloned()
                .collect())
        })
    }
}
