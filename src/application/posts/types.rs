use std::time::Duration;

use thiserror::Error;

use crate::application::repos::RepoError;
use crate::application::search::SearchError;
use crate::domain::entities::{PostRecord, SearchDocument};
use crate::domain::error::DomainError;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_RELATED_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("post {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Repo(#[from] RepoError),
    /// The durable row is committed; only its index projection is missing.
    #[error("post {post_id} was stored but could not be indexed")]
    IndexWrite {
        post_id: i64,
        #[source]
        source: SearchError,
    },
    #[error("search query failed")]
    Search(#[source] SearchError),
}

/// Tunables for the cache-aside read path.
#[derive(Debug, Clone)]
pub struct ConsistencyPolicy {
    pub cache_ttl: Duration,
    pub related_limit: usize,
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            related_limit: DEFAULT_RELATED_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostWithRelated {
    pub post: PostRecord,
    pub related: Vec<SearchDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReindexSummary {
    pub indexed: u64,
    pub failed: Vec<i64>,
}
