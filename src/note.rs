//! Core data structures for the notopia client.
//!
//! This module contains the primary document types exchanged with the
//! remote store: Paste, Folder and the identity Session. Field names are
//! serialized in camelCase to match the service's document schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-authored markdown note, the primary content unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paste {
    /// Remote-assigned document ID. Absent until the paste has been
    /// persisted by the remote store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Short public identifier for the read-only view URL. Assigned
    /// exactly once, at first persistence, and never regenerated.
    #[serde(default)]
    pub slug: Option<String>,
    /// Paste title
    pub title: String,
    /// Paste content in Markdown format
    pub content: String,
    /// Tags for organization, insertion order preserved
    #[serde(default)]
    pub tags: Vec<String>,
    /// Folder the paste belongs to, if any
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Pinned pastes sort ahead of everything else
    #[serde(default)]
    pub is_pinned: bool,
    /// Owning user. Absent on an offline draft until sync stamps it.
    #[serde(default)]
    pub user_id: Option<String>,
    /// When the paste was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Paste {
    /// Creates a new unpersisted paste with the given title, content and
    /// tags. The slug and document ID are assigned later, at first
    /// persistence.
    pub fn new(title: String, content: String, tags: Vec<String>) -> Self {
        let now = Utc::now();
        Paste {
            id: None,
            slug: None,
            title,
            content,
            tags,
            folder_id: None,
            is_pinned: false,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A folder grouping zero or more pastes via their `folder_id`.
///
/// Deleting a folder does not cascade to its pastes; their `folder_id`
/// keeps pointing at the removed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Remote-assigned document ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Folder display name, non-empty
    pub name: String,
    /// Owning user
    pub user_id: String,
    /// When the folder was created
    pub created_at: DateTime<Utc>,
}

impl Folder {
    pub fn new(name: String, user_id: String) -> Self {
        Folder {
            id: None,
            name,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Current identity session, owned by the identity provider. The client
/// only reads `uid` to stamp ownership on documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: String,
}

/// Input for creating a paste.
#[derive(Debug, Clone, Default)]
pub struct NewPaste {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub folder_id: Option<String>,
}

/// Partial update applied to an existing paste. Fields left as `None`
/// keep their current value; the slug is never part of an update.
#[derive(Debug, Clone, Default)]
pub struct PasteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub folder_id: Option<Option<String>>,
}
