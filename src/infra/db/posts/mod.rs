mod read;
mod types;
mod write;

use async_trait::async_trait;

use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::entities::{PostDraft, PostRecord};

use super::PostgresRepositories;

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn create_with_log(&self, draft: PostDraft) -> Result<PostRecord, RepoError> {
        self.insert_post_with_log(draft).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        self.fetch_post(id).await
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<(), RepoError> {
        self.replace_post(id, draft).await
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<PostRecord>, RepoError> {
        self.fetch_posts_with_tag(tag).await
    }

    async fn list_after(&self, after_id: i64, limit: u32) -> Result<Vec<PostRecord>, RepoError> {
        self.fetch_posts_after(after_id, limit).await
    }
}
