//! Read-through cache contract for posts.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::PostRecord;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache ttl {0:?} is out of range")]
    TtlOutOfRange(Duration),
}

/// Disposable, expiring copy of posts keyed by id.
///
/// Every failure is recoverable from the caller's point of view: the record store remains the
/// source of truth.
#[async_trait]
pub trait PostCache: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<PostRecord>, CacheError>;

    async fn set(&self, post: &PostRecord, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, id: i64) -> Result<(), CacheError>;
}
