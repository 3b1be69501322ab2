//! Wire types for the postsync HTTP API.
//!
//! These are shared between the server and any client that talks to it. They carry no
//! behavior beyond (de)serialization.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostWriteRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Search projection of a post; it carries no timestamp.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchDocumentView {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Response of `GET /posts/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostWithRelatedView {
    pub post: PostView,
    pub related: Vec<SearchDocumentView>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagQuery {
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TextQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
