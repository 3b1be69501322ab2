//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Canonical post as owned by the record store.
///
/// `id` and `created_at` are assigned by the record store on creation and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Post fields supplied by a caller, used both for creation and full replacement.
///
/// Construct through [`PostDraft::new`] so tags are normalized and the title is checked.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Projection of a post carried by the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&PostRecord> for SearchDocument {
    fn from(post: &PostRecord) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            tags: post.tags.clone(),
        }
    }
}

/// Append-only audit entry written in the same transaction as a post insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLogEntry {
    pub action: &'static str,
    pub post_id: i64,
}

impl ActivityLogEntry {
    pub const NEW_POST: &'static str = "new_post";

    pub fn new_post(post_id: i64) -> Self {
        Self {
            action: Self::NEW_POST,
            post_id,
        }
    }
}
