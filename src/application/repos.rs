//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{PostDraft, PostRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Durable record of truth for posts.
///
/// The store owns post identity and creation timestamps.
#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Insert the post and its `new_post` activity entry in one transaction.
    async fn create_with_log(&self, draft: PostDraft) -> Result<PostRecord, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError>;

    /// Replace title, content and tags in place. Fails with [`RepoError::NotFound`] when no row
    /// has the given id.
    async fn update(&self, id: i64, draft: PostDraft) -> Result<(), RepoError>;

    /// Posts whose tag set contains `tag` exactly, ordered by id.
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<PostRecord>, RepoError>;

    /// Up to `limit` posts with `id > after_id`, ordered by id.
    async fn list_after(&self, after_id: i64, limit: u32) -> Result<Vec<PostRecord>, RepoError>;
}
