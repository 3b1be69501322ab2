//! Search index contract for posts.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{PostRecord, SearchDocument};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search transport error: {0}")]
    Transport(String),
    #[error("search engine returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("search response could not be decoded: {0}")]
    Decode(String),
}

/// Eventually consistent projection of posts supporting text and tag similarity queries.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create the index when it does not exist yet. Idempotent.
    async fn ensure_index(&self) -> Result<(), SearchError>;

    /// Insert or replace the document for `post.id`.
    async fn upsert(&self, post: &PostRecord) -> Result<(), SearchError>;

    /// Free-text match over title and content, most relevant first.
    async fn search_text(&self, query: &str) -> Result<Vec<SearchDocument>, SearchError>;

    /// Documents sharing at least one of `tags`, never including `exclude_id`, at most `limit`.
    ///
    /// An empty tag set yields an empty result.
    async fn related_by_tags(
        &self,
        tags: &[String],
        exclude_id: i64,
        limit: usize,
    ) -> Result<Vec<SearchDocument>, SearchError>;
}
