mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use postsync::application::posts::{ConsistencyPolicy, PostService, PostServiceError};
use postsync::application::repos::RepoError;
use postsync::application::search::SearchIndex;
use postsync::cache::{CacheConfig, PostCacheStore};
use postsync::domain::entities::{ActivityLogEntry, SearchDocument};
use postsync::domain::error::DomainError;

use support::{FakeIndex, FakeRecords, Harness, draft};

// ============ Create ============

#[tokio::test]
async fn create_persists_post_with_activity_entry_and_indexes_it() {
    let h = Harness::new();

    let post = h
        .service
        .create_post(draft("A", "B", &["go", "backend"]))
        .await
        .expect("create");

    assert!(post.id > 0);
    assert_eq!(h.records.stored(post.id).await, Some(post.clone()));
    assert_eq!(
        *h.records.activity.lock().await,
        vec![ActivityLogEntry::new_post(post.id)]
    );
    assert_eq!(
        h.index.document(post.id).await,
        Some(SearchDocument {
            id: post.id,
            title: "A".into(),
            content: "B".into(),
            tags: vec!["go".into(), "backend".into()],
        })
    );
}

#[tokio::test]
async fn create_does_not_touch_the_cache() {
    let h = Harness::new();
    h.service
        .create_post(draft("A", "B", &[]))
        .await
        .expect("create");

    assert_eq!(h.cache.set_calls(), 0);
    assert_eq!(h.cache.delete_calls(), 0);
}

#[tokio::test]
async fn failed_durable_insert_leaves_nothing_behind() {
    let h = Harness::new();
    h.records.fail_create();

    let err = h
        .service
        .create_post(draft("A", "B", &["go"]))
        .await
        .expect_err("insert fails");

    assert!(matches!(err, PostServiceError::Repo(RepoError::Persistence(_))));
    assert!(h.records.posts.lock().await.is_empty());
    assert!(h.records.activity.lock().await.is_empty());
    assert_eq!(h.index.upsert_calls(), 0);
}

#[tokio::test]
async fn index_failure_fails_create_but_row_stays_committed() {
    let h = Harness::new();
    h.index.fail_upsert();

    let err = h
        .service
        .create_post(draft("A", "B", &["go"]))
        .await
        .expect_err("index write fails");

    let PostServiceError::IndexWrite { post_id, .. } = err else {
        panic!("expected index write failure, got {err:?}");
    };
    assert!(h.records.stored(post_id).await.is_some());
    assert_eq!(h.records.activity.lock().await.len(), 1);
    assert!(h.index.document(post_id).await.is_none());
}

// ============ Read ============

#[tokio::test]
async fn second_read_within_ttl_skips_record_store() {
    let h = Harness::new();
    let post = h.seed_indexed("cached", &["rust"]).await;

    let first = h.service.get_post(post.id).await.expect("first read");
    assert_eq!(first.post, post);
    assert_eq!(h.records.find_calls(), 1);
    assert!(h.cache.contains(post.id).await);
    assert_eq!(
        *h.cache.last_ttl.lock().await,
        Some(Duration::from_secs(300))
    );

    let second = h.service.get_post(post.id).await.expect("second read");
    assert_eq!(second.post, post);
    assert_eq!(h.records.find_calls(), 1);
}

#[tokio::test]
async fn missing_post_is_not_found_and_not_cached() {
    let h = Harness::new();

    let err = h.service.get_post(404).await.expect_err("missing");
    assert!(matches!(err, PostServiceError::NotFound(404)));
    assert_eq!(h.cache.set_calls(), 0);
}

#[tokio::test]
async fn cache_read_failure_falls_back_to_record_store() {
    let h = Harness::new();
    let post = h.seed_indexed("fallback", &[]).await;
    h.cache.fail_get.store(true, Ordering::SeqCst);

    let found = h.service.get_post(post.id).await.expect("read");
    assert_eq!(found.post, post);
    assert_eq!(h.records.find_calls(), 1);
}

#[tokio::test]
async fn cache_fill_failure_still_returns_post() {
    let h = Harness::new();
    let post = h.seed_indexed("unfilled", &[]).await;
    h.cache.fail_set.store(true, Ordering::SeqCst);

    let found = h.service.get_post(post.id).await.expect("read");
    assert_eq!(found.post, post);
    assert!(!h.cache.contains(post.id).await);
}

#[tokio::test]
async fn record_store_failure_on_miss_propagates() {
    let h = Harness::new();
    let post = h.seed_indexed("slow", &[]).await;
    h.records.fail_find();

    let err = h.service.get_post(post.id).await.expect_err("timeout");
    assert!(matches!(err, PostServiceError::Repo(RepoError::Timeout)));
}

#[tokio::test]
async fn related_posts_exclude_self_and_respect_limit() {
    let h = Harness::with_policy(ConsistencyPolicy {
        related_limit: 2,
        ..ConsistencyPolicy::default()
    });
    let post = h.seed_indexed("origin", &["go"]).await;
    for i in 0..4 {
        h.seed_indexed(&format!("peer {i}"), &["go"]).await;
    }
    h.index.leak_excluded.store(true, Ordering::SeqCst);

    let found = h.service.get_post(post.id).await.expect("read");
    assert_eq!(found.related.len(), 2);
    assert!(found.related.iter().all(|doc| doc.id != post.id));
}

#[tokio::test]
async fn related_lookup_failure_yields_empty_list() {
    let h = Harness::new();
    let post = h.seed_indexed("lonely", &["go"]).await;
    h.seed_indexed("peer", &["go"]).await;
    h.index.fail_search();

    let found = h.service.get_post(post.id).await.expect("read");
    assert_eq!(found.post, post);
    assert!(found.related.is_empty());
}

#[tokio::test]
async fn cache_hit_still_resolves_related_posts() {
    let h = Harness::new();
    let post = h.seed_indexed("origin", &["go"]).await;
    let peer = h.seed_indexed("peer", &["go"]).await;

    h.service.get_post(post.id).await.expect("warm cache");
    let related_before = h.index.related_calls.load(Ordering::SeqCst);

    let hit = h.service.get_post(post.id).await.expect("cached read");
    assert_eq!(h.records.find_calls(), 1);
    assert_eq!(
        h.index.related_calls.load(Ordering::SeqCst),
        related_before + 1
    );
    assert_eq!(
        hit.related.iter().map(|doc| doc.id).collect::<Vec<_>>(),
        vec![peer.id]
    );

    h.index.fail_search();
    let degraded = h.service.get_post(post.id).await.expect("cached read");
    assert_eq!(h.records.find_calls(), 1);
    assert_eq!(degraded.post, post);
    assert!(degraded.related.is_empty());
}

#[tokio::test]
async fn oversized_ttl_degrades_to_uncached_reads() {
    let records = Arc::new(FakeRecords::default());
    let cache = Arc::new(PostCacheStore::new(&CacheConfig::default()));
    let service = PostService::new(
        records.clone(),
        cache.clone(),
        Arc::new(FakeIndex::default()),
        ConsistencyPolicy {
            cache_ttl: Duration::from_secs(u64::MAX),
            ..ConsistencyPolicy::default()
        },
    );
    let post = records.seed("eternal", &[]).await;

    let first = service.get_post(post.id).await.expect("first read");
    assert_eq!(first.post, post);
    assert!(cache.is_empty());

    service.get_post(post.id).await.expect("second read");
    assert_eq!(records.find_calls(), 2);
}

#[tokio::test]
async fn untagged_post_has_no_related_posts() {
    let h = Harness::new();
    let post = h.seed_indexed("untagged", &[]).await;
    h.seed_indexed("tagged", &["go"]).await;

    let found = h.service.get_post(post.id).await.expect("read");
    assert!(found.related.is_empty());
}

// ============ Update ============

#[tokio::test]
async fn update_invalidates_cache_and_reindexes() {
    let h = Harness::new();
    let post = h.seed_indexed("before", &["go"]).await;
    h.service.get_post(post.id).await.expect("warm cache");
    assert!(h.cache.contains(post.id).await);

    h.service
        .update_post(post.id, draft("after", "new body", &["rust"]))
        .await
        .expect("update");

    assert!(!h.cache.contains(post.id).await);
    let stored = h.records.stored(post.id).await.expect("row");
    assert_eq!(stored.title, "after");
    assert_eq!(stored.content, "new body");
    assert_eq!(stored.tags, vec!["rust".to_string()]);
    assert_eq!(stored.created_at, post.created_at);

    let document = h.index.document(post.id).await.expect("indexed");
    assert_eq!(document.title, "after");

    let reread = h.service.get_post(post.id).await.expect("read");
    assert_eq!(reread.post.title, "after");
}

#[tokio::test]
async fn update_of_missing_post_is_not_found() {
    let h = Harness::new();

    let err = h
        .service
        .update_post(77, draft("ghost", "", &[]))
        .await
        .expect_err("missing");

    assert!(matches!(err, PostServiceError::NotFound(77)));
    assert_eq!(h.cache.delete_calls(), 0);
    assert_eq!(h.index.upsert_calls(), 0);
}

#[tokio::test]
async fn update_tolerates_cache_and_index_failures() {
    let h = Harness::new();
    let post = h.seed_indexed("sturdy", &[]).await;
    h.cache.fail_delete.store(true, Ordering::SeqCst);
    h.index.fail_upsert();

    h.service
        .update_post(post.id, draft("still saved", "", &[]))
        .await
        .expect("update succeeds");

    assert_eq!(
        h.records.stored(post.id).await.expect("row").title,
        "still saved"
    );
}

// ============ Search ============

#[tokio::test]
async fn blank_tag_is_rejected_without_store_calls() {
    let h = Harness::new();

    let err = h.service.search_by_tag("  ").await.expect_err("blank");
    assert!(matches!(
        err,
        PostServiceError::Domain(DomainError::Validation { .. })
    ));
    assert_eq!(h.records.tag_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tag_with_nul_is_rejected_without_store_calls() {
    let h = Harness::new();

    let err = h.service.search_by_tag("go\0").await.expect_err("nul");
    assert!(matches!(
        err,
        PostServiceError::Domain(DomainError::Validation { .. })
    ));
    assert_eq!(h.records.tag_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_by_tag_matches_exact_tags() {
    let h = Harness::new();
    let go = h.seed_indexed("go post", &["go", "backend"]).await;
    h.seed_indexed("golang post", &["golang"]).await;

    let found = h.service.search_by_tag("go").await.expect("search");
    assert_eq!(found, vec![go]);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let h = Harness::new();
    let err = h.service.search_text("").await.expect_err("blank");
    assert!(matches!(err, PostServiceError::Domain(_)));
}

#[tokio::test]
async fn text_search_failure_propagates() {
    let h = Harness::new();
    h.index.fail_search();

    let err = h.service.search_text("rust").await.expect_err("down");
    assert!(matches!(err, PostServiceError::Search(_)));
}

// ============ Reindex ============

#[tokio::test]
async fn reindex_walks_every_post_in_batches() {
    let h = Harness::new();
    for i in 0..5 {
        h.records.seed(&format!("post {i}"), &["bulk"]).await;
    }

    let summary = h.service.reindex_all(2).await.expect("reindex");
    assert_eq!(summary.indexed, 5);
    assert!(summary.failed.is_empty());
    assert_eq!(h.index.documents.lock().await.len(), 5);
}

#[tokio::test]
async fn reindex_collects_failures_and_continues() {
    let h = Harness::new();
    let first = h.records.seed("first", &[]).await;
    let second = h.records.seed("second", &[]).await;
    h.index.reject_ids.lock().await.push(first.id);

    let summary = h.service.reindex_all(10).await.expect("reindex");
    assert_eq!(summary.indexed, 1);
    assert_eq!(summary.failed, vec![first.id]);
    assert!(h.index.document(second.id).await.is_some());
}

// ============ End to end ============

#[tokio::test]
async fn create_update_read_round() {
    let h = Harness::new();
    let backend_only = h.seed_indexed("ops", &["backend"]).await;

    let post = h
        .service
        .create_post(draft("A", "B", &["go", "backend"]))
        .await
        .expect("create");
    assert!(h.index.document(post.id).await.is_some());

    h.service
        .update_post(post.id, draft("A2", "B2", &["go"]))
        .await
        .expect("update");

    let found = h.service.get_post(post.id).await.expect("read");
    assert_eq!(found.post.title, "A2");
    assert_eq!(found.post.content, "B2");
    assert!(found.related.iter().all(|doc| doc.id != backend_only.id));

    let related = h
        .index
        .related_by_tags(&found.post.tags, post.id, 5)
        .await
        .expect("related");
    assert!(related.iter().all(|doc| doc.id != post.id));
}
