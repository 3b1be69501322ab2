//! Cache storage implementation.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tokio::time::Instant;

use crate::application::cache::{CacheError, PostCache};
use crate::domain::entities::PostRecord;

use super::config::CacheConfig;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

struct CachedPost {
    payload: Bytes,
    expires_at: Instant,
}

/// LRU post cache with per-entry expiry.
///
/// Posts are kept as encoded JSON so every read hands out a fresh copy decoded at the cache
/// boundary, the same way a networked cache would.
pub struct PostCacheStore {
    entries: Mutex<LruCache<i64, CachedPost>>,
}

impl PostCacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    /// Number of stored entries, including ones that have expired but not been read since.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn insert_raw(&self, id: i64, payload: impl Into<Bytes>, ttl: Duration) {
        let entry = CachedPost {
            payload: payload.into(),
            expires_at: Instant::now() + ttl,
        };
        mutex_lock(&self.entries, SOURCE, "insert_raw").put(id, entry);
    }

    fn live_payload(&self, id: i64) -> Option<Bytes> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        let expired = match entries.get(&id) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.payload.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(&id);
            counter!("postsync_cache_expired_total").increment(1);
        }
        None
    }
}

#[async_trait]
impl PostCache for PostCacheStore {
    async fn get(&self, id: i64) -> Result<Option<PostRecord>, CacheError> {
        let Some(payload) = self.live_payload(id) else {
            return Ok(None);
        };

        match serde_json::from_slice(&payload) {
            Ok(post) => Ok(Some(post)),
            Err(err) => {
                mutex_lock(&self.entries, SOURCE, "get.drop_corrupt").pop(&id);
                Err(CacheError::Codec(err))
            }
        }
    }

    async fn set(&self, post: &PostRecord, ttl: Duration) -> Result<(), CacheError> {
        let payload = Bytes::from(serde_json::to_vec(post)?);
        let mut entries = mutex_lock(&self.entries, SOURCE, "set");

        if ttl.is_zero() {
            entries.pop(&post.id);
            return Ok(());
        }

        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or(CacheError::TtlOutOfRange(ttl))?;
        let entry = CachedPost {
            payload,
            expires_at,
        };
        if let Some((evicted, _)) = entries.push(post.id, entry) {
            if evicted != post.id {
                counter!("postsync_cache_evict_total").increment(1);
            }
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), CacheError> {
        mutex_lock(&self.entries, SOURCE, "delete").pop(&id);
        Ok(())
    }
}
