use sqlx::PgConnection;

use crate::domain::entities::ActivityLogEntry;

/// Append an activity entry on the caller's connection, normally inside the transaction that
/// created the referenced post.
pub(super) async fn append_activity(
    conn: &mut PgConnection,
    entry: &ActivityLogEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO activity_logs (action, post_id)
        VALUES ($1, $2)
        "#,
    )
    .bind(entry.action)
    .bind(entry.post_id)
    .execute(conn)
    .await?;

    Ok(())
}
