//! In-memory stand-ins for the record store, cache and search index.
//!
//! Each fake counts its calls and can be told to fail, so tests can observe which
//! collaborators a coordinator flow touched.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use postsync::application::cache::{CacheError, PostCache};
use postsync::application::posts::{ConsistencyPolicy, PostService};
use postsync::application::repos::{PostsRepo, RepoError};
use postsync::application::search::{SearchError, SearchIndex};
use postsync::domain::entities::{ActivityLogEntry, PostDraft, PostRecord, SearchDocument};

#[derive(Default)]
pub struct FakeRecords {
    pub posts: Mutex<BTreeMap<i64, PostRecord>>,
    pub activity: Mutex<Vec<ActivityLogEntry>>,
    next_id: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub tag_calls: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_find: AtomicBool,
    /// Artificial latency added to tag lookups.
    pub tag_delay: Mutex<Option<Duration>>,
}

impl FakeRecords {
    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn fail_find(&self) {
        self.fail_find.store(true, Ordering::SeqCst);
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub async fn seed(&self, title: &str, tags: &[&str]) -> PostRecord {
        let draft = PostDraft::new(
            title,
            format!("{title} body"),
            tags.iter().map(|tag| tag.to_string()).collect(),
        )
        .expect("valid draft");
        self.create_with_log(draft).await.expect("seed post")
    }

    pub async fn stored(&self, id: i64) -> Option<PostRecord> {
        self.posts.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl PostsRepo for FakeRecords {
    async fn create_with_log(&self, draft: PostDraft) -> Result<PostRecord, RepoError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("insert rejected".into()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let post = PostRecord {
            id,
            title: draft.title,
            content: draft.content,
            tags: draft.tags,
            created_at: OffsetDateTime::now_utc(),
        };
        self.posts.lock().await.insert(id, post.clone());
        self.activity
            .lock()
            .await
            .push(ActivityLogEntry::new_post(id));
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        Ok(self.posts.lock().await.get(&id).cloned())
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<(), RepoError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut posts = self.posts.lock().await;
        let post = posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.title = draft.title;
        post.content = draft.content;
        post.tags = draft.tags;
        Ok(())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<PostRecord>, RepoError> {
        self.tag_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.tag_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .posts
            .lock()
            .await
            .values()
            .filter(|post| post.tags.iter().any(|t| t == tag))
            .cloned()
            .collect())
    }

    async fn list_after(&self, after_id: i64, limit: u32) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .await
            .range(after_id + 1..)
            .take(limit as usize)
            .map(|(_, post)| post.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct FakeCache {
    pub entries: Mutex<HashMap<i64, PostRecord>>,
    pub last_ttl: Mutex<Option<Duration>>,
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl FakeCache {
    pub async fn contains(&self, id: i64) -> bool {
        self.entries.lock().await.contains_key(&id)
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostCache for FakeCache {
    async fn get(&self, id: i64) -> Result<Option<PostRecord>, CacheError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".into()));
        }
        Ok(self.entries.lock().await.get(&id).cloned())
    }

    async fn set(&self, post: &PostRecord, ttl: Duration) -> Result<(), CacheError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".into()));
        }
        *self.last_ttl.lock().await = Some(ttl);
        self.entries.lock().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), CacheError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".into()));
        }
        self.entries.lock().await.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeIndex {
    pub documents: Mutex<BTreeMap<i64, SearchDocument>>,
    pub upsert_calls: AtomicUsize,
    pub related_calls: AtomicUsize,
    pub fail_upsert: AtomicBool,
    pub fail_search: AtomicBool,
    /// Ignore `exclude_id` when answering related queries.
    pub leak_excluded: AtomicBool,
    /// Post ids whose upsert is rejected.
    pub reject_ids: Mutex<Vec<i64>>,
}

impl FakeIndex {
    pub fn fail_upsert(&self) {
        self.fail_upsert.store(true, Ordering::SeqCst);
    }

    pub fn fail_search(&self) {
        self.fail_search.store(true, Ordering::SeqCst);
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub async fn document(&self, id: i64) -> Option<SearchDocument> {
        self.documents.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl SearchIndex for FakeIndex {
    async fn ensure_index(&self) -> Result<(), SearchError> {
        Ok(())
    }

    async fn upsert(&self, post: &PostRecord) -> Result<(), SearchError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let rejected = self.reject_ids.lock().await.contains(&post.id);
        if self.fail_upsert.load(Ordering::SeqCst) || rejected {
            return Err(SearchError::Status {
                status: 503,
                body: "cluster unavailable".into(),
            });
        }
        self.documents
            .lock()
            .await
            .insert(post.id, SearchDocument::from(post));
        Ok(())
    }

    async fn search_text(&self, query: &str) -> Result<Vec<SearchDocument>, SearchError> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(SearchError::Transport("connection refused".into()));
        }
        let needle = query.to_lowercase();
        Ok(self
            .documents
            .lock()
            .await
            .values()
            .filter(|doc| {
                doc.title.to_lowercase().contains(&needle)
                    || doc.content.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn related_by_tags(
        &self,
        tags: &[String],
        exclude_id: i64,
        limit: usize,
    ) -> Result<Vec<SearchDocument>, SearchError> {
        self.related_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(SearchError::Transport("connection refused".into()));
        }
        if tags.is_empty() {
            return Ok(Vec::new());
        }
        let leak = self.leak_excluded.load(Ordering::SeqCst);
        let mut related: Vec<SearchDocument> = self
            .documents
            .lock()
            .await
            .values()
            .filter(|doc| leak || doc.id != exclude_id)
            .filter(|doc| doc.tags.iter().any(|tag| tags.contains(tag)))
            .cloned()
            .collect();
        if !leak {
            related.truncate(limit);
        }
        Ok(related)
    }
}

pub struct Harness {
    pub records: Arc<FakeRecords>,
    pub cache: Arc<FakeCache>,
    pub index: Arc<FakeIndex>,
    pub service: PostService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(ConsistencyPolicy::default())
    }

    pub fn with_policy(policy: ConsistencyPolicy) -> Self {
        let records = Arc::new(FakeRecords::default());
        let cache = Arc::new(FakeCache::default());
        let index = Arc::new(FakeIndex::default());
        let service = PostService::new(records.clone(), cache.clone(), index.clone(), policy);
        Self {
            records,
            cache,
            index,
            service,
        }
    }

    /// Seed a post into the record store and the index.
    pub async fn seed_indexed(&self, title: &str, tags: &[&str]) -> PostRecord {
        let post = self.records.seed(title, tags).await;
        self.index.upsert(&post).await.expect("seed index");
        post
    }
}

pub fn draft(title: &str, content: &str, tags: &[&str]) -> PostDraft {
    PostDraft::new(
        title,
        content,
        tags.iter().map(|tag| tag.to_string()).collect(),
    )
    .expect("valid draft")
}
