use crate::application::repos::RepoError;
use crate::domain::entities::{ActivityLogEntry, PostDraft, PostRecord};
use crate::infra::db::activity::append_activity;
use crate::infra::db::map_sqlx_error;

use super::PostgresRepositories;
use super::types::{POST_COLUMNS, PostRow};

impl PostgresRepositories {
    /// Insert a post and its `new_post` activity entry atomically.
    ///
    /// The transaction is rolled back on drop unless both inserts succeed.
    pub(crate) async fn insert_post_with_log(
        &self,
        draft: PostDraft,
    ) -> Result<PostRecord, RepoError> {
        let PostDraft {
            title,
            content,
            tags,
        } = draft;

        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let sql = format!(
            "INSERT INTO posts (title, content, tags) VALUES ($1, $2, $3) RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(title)
            .bind(content)
            .bind(tags)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        append_activity(&mut *tx, &ActivityLogEntry::new_post(row.id))
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    pub(crate) async fn replace_post(&self, id: i64, draft: PostDraft) -> Result<(), RepoError> {
        let PostDraft {
            title,
            content,
            tags,
        } = draft;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2,
                content = $3,
                tags = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(tags)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
