use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record key as sent by the backend: `id`, `_id` or both
#[derive(Debug, Deserialize)]
struct RecordId {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
}

impl RecordId {
    fn resolve(self) -> Result<String, String> {
        self.id
            .or(self.mongo_id)
            .ok_or_else(|| "missing field `id`".to_string())
    }
}

/// An account known to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

#[derive(Deserialize)]
struct UserRecord {
    #[serde(flatten)]
    key: RecordId,
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: String,
}

impl TryFrom<UserRecord> for User {
    type Error = String;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.key.resolve()?,
            username: record.username,
            email: record.email,
            role: record.role,
        })
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.username.is_empty() {
            write!(f, "{}", self.email)
        } else {
            write!(f, "{} <{}>", self.username, self.email)
        }
    }
}

/// A user reference that the backend may or may not have populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Resolved(User),
    Id(String),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Resolved(user) => &user.id,
            UserRef::Id(id) => id,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            UserRef::Resolved(user) => Some(user),
            UserRef::Id(_) => None,
        }
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRef::Resolved(user) => write!(f, "{user}"),
            UserRef::Id(id) => write!(f, "{id}"),
        }
    }
}

/// A fully populated document as returned by the document endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DocumentRecord")]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Serialized rich-text content
    pub content: String,
    pub owner: User,
    pub collaborators: Vec<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    #[serde(flatten)]
    key: RecordId,
    title: String,
    #[serde(default)]
    content: String,
    owner: User,
    #[serde(default)]
    collaborators: Vec<User>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<DocumentRecord> for Document {
    type Error = String;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.key.resolve()?,
            title: record.title,
            content: record.content,
            owner: record.owner,
            collaborators: record.collaborators,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Document {
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.owner.id == user.id
    }

    pub fn has_collaborator(&self, user_id: &str) -> bool {
        self.collaborators.iter().any(|c| c.id == user_id)
    }

    /// Drop repeated collaborator entries, keeping the first occurrence
    pub fn dedup_collaborators(&mut self) {
        let mut seen = Vec::with_capacity(self.collaborators.len());
        self.collaborators.retain(|c| {
            if seen.contains(&c.id) {
                false
            } else {
                seen.push(c.id.clone());
                true
            }
        });
    }

    /// Remove a collaborator, returning whether one was present
    pub fn remove_collaborator(&mut self, user_id: &str) -> bool {
        let before = self.collaborators.len();
        self.collaborators.retain(|c| c.id != user_id);
        self.collaborators.len() != before
    }
}

/// Dashboard listing entry; owner and collaborators may be bare ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SummaryRecord")]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub owner: UserRef,
    pub collaborators: Vec<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRecord {
    #[serde(flatten)]
    key: RecordId,
    title: String,
    #[serde(default)]
    content: String,
    owner: UserRef,
    #[serde(default)]
    collaborators: Vec<UserRef>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<SummaryRecord> for DocumentSummary {
    type Error = String;

    fn try_from(record: SummaryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.key.resolve()?,
            title: record.title,
            content: record.content,
            owner: record.owner,
            collaborators: record.collaborators,
            updated_at: record.updated_at,
        })
    }
}

impl From<Document> for DocumentSummary {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            content: doc.content,
            owner: UserRef::Resolved(doc.owner),
            collaborators: doc.collaborators.into_iter().map(UserRef::Resolved).collect(),
            updated_at: doc.updated_at,
        }
    }
}

/// Immutable historical snapshot of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "VersionRecord")]
pub struct Version {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    pub edited_by: UserRef,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionRecord {
    #[serde(flatten)]
    key: RecordId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    edited_at: Option<DateTime<Utc>>,
    edited_by: UserRef,
}

impl TryFrom<VersionRecord> for Version {
    type Error = String;

    fn try_from(record: VersionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.key.resolve()?,
            title: record.title,
            content: record.content,
            edited_at: record.edited_at,
            edited_by: record.edited_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: format!("user{id}"),
            email: format!("{id}@example.com"),
            role: "user".to_string(),
        }
    }

    #[test]
    fn test_document_from_backend_json() {
        let json = r#"{
            "_id": "d1",
            "title": "Notes",
            "content": "<p>hi</p>",
            "owner": {"_id": "u1", "username": "ann", "email": "a@b.com", "role": "user"},
            "collaborators": [{"id": "u2", "username": "bob", "email": "b@b.com", "role": "user"}],
            "versions": ["v1"],
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-02T10:00:00.000Z"
        }"#;

        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, "d1");
        assert_eq!(doc.owner.id, "u1");
        assert_eq!(doc.collaborators[0].id, "u2");
        assert!(doc.created_at.is_some());
        assert!(doc.is_owned_by(&user("u1")));
        assert!(!doc.is_owned_by(&user("u2")));
    }

    #[test]
    fn test_summary_accepts_unpopulated_owner() {
        let json = r#"{"_id": "42", "title": "Plan", "content": "", "owner": "u1", "collaborators": ["u2"]}"#;
        let summary: DocumentSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.owner, UserRef::Id("u1".to_string()));
        assert_eq!(summary.collaborators[0].id(), "u2");
        assert!(summary.owner.user().is_none());
    }

    #[test]
    fn test_version_with_populated_editor() {
        let json = r#"{
            "_id": "v1",
            "title": "Draft",
            "content": "old",
            "editedAt": "2024-03-01T10:00:00Z",
            "editedBy": {"_id": "u1", "username": "ann", "email": "a@b.com", "role": "user"}
        }"#;
        let version: Version = serde_json::from_str(json).unwrap();
        assert_eq!(version.id, "v1");
        assert_eq!(version.edited_by.id(), "u1");
        assert_eq!(version.edited_by.to_string(), "ann <a@b.com>");
    }

    #[test]
    fn test_ids_accept_both_keys() {
        let json = r#"{
            "_id": "d1",
            "id": "d1",
            "title": "Notes",
            "owner": {"_id": "u1", "id": "u1", "username": "ann", "email": "a@b.com", "role": "user"},
            "collaborators": [{"_id": "u2", "id": "u2"}]
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, "d1");
        assert_eq!(doc.owner.id, "u1");
        assert_eq!(doc.collaborators[0].id, "u2");

        let user: User =
            serde_json::from_str(r#"{"_id":"u1","id":"u1","username":"ann"}"#).unwrap();
        assert_eq!(user.id, "u1");

        let version: Version =
            serde_json::from_str(r#"{"_id":"v1","id":"v1","editedBy":"u1"}"#).unwrap();
        assert_eq!(version.id, "v1");
    }

    #[test]
    fn test_record_without_id_is_rejected() {
        let err = serde_json::from_str::<User>(r#"{"username":"ann"}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `id`"));
    }

    #[test]
    fn test_user_serializes_plain_id() {
        let value = serde_json::to_value(user("u1")).unwrap();
        assert_eq!(value["id"], "u1");
        assert!(value.get("_id").is_none());
    }

    #[test]
    fn test_dedup_collaborators_keeps_first() {
        let mut doc = Document {
            id: "d".to_string(),
            title: String::new(),
            content: String::new(),
            owner: user("1"),
            collaborators: vec![user("2"), user("3"), user("2")],
            created_at: None,
            updated_at: None,
        };
        doc.dedup_collaborators();
        let ids: Vec<_> = doc.collaborators.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);

        assert!(doc.remove_collaborator("2"));
        assert!(!doc.remove_collaborator("2"));
        assert!(!doc.has_collaborator("2"));
        assert!(doc.has_collaborator("3"));
    }
}
