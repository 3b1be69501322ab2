use std::sync::Arc;

use crate::application::cache::PostCache;
use crate::application::repos::PostsRepo;
use crate::application::search::SearchIndex;

use super::types::ConsistencyPolicy;

/// Coordinates post writes and reads across the record store, the cache and the search index.
///
/// The record store is the only source of truth. Create treats the index write as part of the
/// request; read and update treat cache and index work as best-effort.
#[derive(Clone)]
pub struct PostService {
    pub(crate) records: Arc<dyn PostsRepo>,
    pub(crate) cache: Arc<dyn PostCache>,
    pub(crate) index: Arc<dyn SearchIndex>,
    pub(crate) policy: ConsistencyPolicy,
}

impl PostService {
    pub fn new(
        records: Arc<dyn PostsRepo>,
        cache: Arc<dyn PostCache>,
        index: Arc<dyn SearchIndex>,
        policy: ConsistencyPolicy,
    ) -> Self {
        Self {
            records,
            cache,
            index,
            policy,
        }
    }

    pub fn policy(&self) -> &ConsistencyPolicy {
        &self.policy
    }
}
