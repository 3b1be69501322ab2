use metrics::counter;
use tracing::{debug, warn};

use crate::domain::entities::{PostRecord, SearchDocument};
use crate::domain::error::DomainError;
use crate::domain::posts::ensure_storable;

use super::service::PostService;
use super::types::{PostServiceError, PostWithRelated};

impl PostService {
    /// Cache-aside read of a single post plus tag-related posts.
    ///
    /// A cache hit is served as-is without consulting the record store.
    pub async fn get_post(&self, id: i64) -> Result<PostWithRelated, PostServiceError> {
        let cached = match self.cache.get(id).await {
            Ok(hit) => hit,
            Err(err) => {
                counter!("postsync_cache_error_total", "op" => "get").increment(1);
                warn!(
                    target = "postsync::posts",
                    post_id = id,
                    error = %err,
                    "cache lookup failed; falling back to record store"
                );
                None
            }
        };

        let post = match cached {
            Some(post) => {
                counter!("postsync_cache_hit_total").increment(1);
                post
            }
            None => {
                counter!("postsync_cache_miss_total").increment(1);
                let post = self
                    .records
                    .find_by_id(id)
                    .await?
                    .ok_or(PostServiceError::NotFound(id))?;

                if let Err(err) = self.cache.set(&post, self.policy.cache_ttl).await {
                    counter!("postsync_cache_error_total", "op" => "set").increment(1);
                    warn!(
                        target = "postsync::posts",
                        post_id = id,
                        error = %err,
                        "cache fill failed"
                    );
                }
                post
            }
        };

        let related = self.related_posts(&post).await;
        Ok(PostWithRelated { post, related })
    }

    pub async fn search_by_tag(&self, tag: &str) -> Result<Vec<PostRecord>, PostServiceError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(DomainError::validation("tag required").into());
        }
        ensure_storable("tag", tag)?;
        Ok(self.records.find_by_tag(tag).await?)
    }

    pub async fn search_text(&self, query: &str) -> Result<Vec<SearchDocument>, PostServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("q required").into());
        }
        self.index
            .search_text(query)
            .await
            .map_err(PostServiceError::Search)
    }

    async fn related_posts(&self, post: &PostRecord) -> Vec<SearchDocument> {
        match self
            .index
            .related_by_tags(&post.tags, post.id, self.policy.related_limit)
            .await
        {
            Ok(related) => {
                debug!(
                    target = "postsync::posts",
                    post_id = post.id,
                    related = related.len(),
                    "related posts resolved"
                );
                related
                    .into_iter()
                    .filter(|doc| doc.id != post.id)
                    .take(self.policy.related_limit)
                    .collect()
            }
            Err(err) => {
                counter!("postsync_index_error_total", "op" => "related").increment(1);
                warn!(
                    target = "postsync::posts",
                    post_id = post.id,
                    error = %err,
                    "related lookup failed; returning none"
                );
                Vec::new()
            }
        }
    }
}
