use crate::application::repos::RepoError;
use crate::domain::entities::PostRecord;
use crate::infra::db::map_sqlx_error;

use super::PostgresRepositories;
use super::types::{POST_COLUMNS, PostRow};

impl PostgresRepositories {
    pub(crate) async fn fetch_post(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    pub(crate) async fn fetch_posts_with_tag(
        &self,
        tag: &str,
    ) -> Result<Vec<PostRecord>, RepoError> {
        // Array containment, so `go` never matches a `golang` tag.
        let sql =
            format!("SELECT {POST_COLUMNS} FROM posts WHERE tags @> ARRAY[$1]::TEXT[] ORDER BY id");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(tag)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    pub(crate) async fn fetch_posts_after(
        &self,
        after_id: i64,
        limit: u32,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id > $1 ORDER BY id LIMIT $2");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(after_id)
            .bind(i64::from(limit))
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }
}
