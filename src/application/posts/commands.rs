use metrics::counter;
use tracing::{error, info, warn};

use crate::application::repos::RepoError;
use crate::domain::entities::{PostDraft, PostRecord};

use super::service::PostService;
use super::types::{PostServiceError, ReindexSummary};

const MAX_REINDEX_BATCH: u32 = 1000;

impl PostService {
    /// Persist a new post with its activity entry, then index it.
    ///
    /// An index failure fails the call but leaves the committed row in place; the row is
    /// reconciled later by [`PostService::reindex_all`]. The cache is not touched.
    pub async fn create_post(&self, draft: PostDraft) -> Result<PostRecord, PostServiceError> {
        let post = self.records.create_with_log(draft).await?;

        if let Err(source) = self.index.upsert(&post).await {
            counter!("postsync_index_error_total", "op" => "create").increment(1);
            error!(
                target = "postsync::posts",
                post_id = post.id,
                error = %source,
                "post committed but indexing failed; row is orphaned from the index"
            );
            return Err(PostServiceError::IndexWrite {
                post_id: post.id,
                source,
            });
        }

        info!(target = "postsync::posts", post_id = post.id, "post created");
        Ok(post)
    }

    /// Replace a post's fields, then invalidate its cache entry and re-project it.
    ///
    /// Only the record store write can fail the call.
    pub async fn update_post(&self, id: i64, draft: PostDraft) -> Result<(), PostServiceError> {
        self.records.update(id, draft).await.map_err(|err| match err {
            RepoError::NotFound => PostServiceError::NotFound(id),
            other => PostServiceError::Repo(other),
        })?;

        if let Err(err) = self.cache.delete(id).await {
            counter!("postsync_cache_error_total", "op" => "delete").increment(1);
            warn!(
                target = "postsync::posts",
                post_id = id,
                error = %err,
                "cache invalidation failed; stale entry lives until expiry"
            );
        }

        match self.records.find_by_id(id).await {
            Ok(Some(post)) => {
                if let Err(err) = self.index.upsert(&post).await {
                    counter!("postsync_index_error_total", "op" => "update").increment(1);
                    warn!(
                        target = "postsync::posts",
                        post_id = id,
                        error = %err,
                        "re-indexing after update failed"
                    );
                }
            }
            Ok(None) => {
                warn!(
                    target = "postsync::posts",
                    post_id = id,
                    "post vanished before re-indexing"
                );
            }
            Err(err) => {
                warn!(
                    target = "postsync::posts",
                    post_id = id,
                    error = %err,
                    "could not reload post for re-indexing"
                );
            }
        }

        info!(target = "postsync::posts", post_id = id, "post updated");
        Ok(())
    }

    /// Re-project every stored post into the search index, walking ids in ascending order.
    ///
    /// Individual upsert failures are collected rather than aborting the walk.
    pub async fn reindex_all(&self, batch_size: u32) -> Result<ReindexSummary, PostServiceError> {
        let batch_size = batch_size.clamp(1, MAX_REINDEX_BATCH);
        let mut summary = ReindexSummary::default();
        let mut after_id = 0;

        loop {
            let batch = self.records.list_after(after_id, batch_size).await?;
            let Some(last) = batch.last() else {
                break;
            };
            after_id = last.id;

            for post in &batch {
                match self.index.upsert(post).await {
                    Ok(()) => summary.indexed += 1,
                    Err(err) => {
                        counter!("postsync_index_error_total", "op" => "reindex").increment(1);
                        warn!(
                            target = "postsync::reindex",
                            post_id = post.id,
                            error = %err,
                            "failed to index post"
                        );
                        summary.failed.push(post.id);
                    }
                }
            }

            if batch.len() < batch_size as usize {
                break;
            }
        }

        Ok(summary)
    }
}
