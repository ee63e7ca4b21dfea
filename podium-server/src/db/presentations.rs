//! Presentation persistence
//!
//! Lookups take the caller's user id so ownership is enforced in SQL.

use podium_common::time::now_rfc3339;
use podium_common::{Error, Result};
use sqlx::SqlitePool;

use crate::models::{Presentation, PresentationStatus};

/// Insert a presentation in `ONGOING` state
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
    video_path: &str,
) -> Result<Presentation> {
    let now = now_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO presentations (user_id, title, video_path, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(video_path)
    .bind(PresentationStatus::Ongoing.as_str())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| Error::Internal("Presentation vanished after insert".to_string()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Presentation>> {
    let presentation = sqlx::query_as::<_, Presentation>("SELECT * FROM presentations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(presentation)
}

/// Presentation `id` if it belongs to `user_id`
pub async fn find_owned(pool: &SqlitePool, id: i64, user_id: i64) -> Result<Option<Presentation>> {
    let presentation = sqlx::query_as::<_, Presentation>(
        "SELECT * FROM presentations WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(presentation)
}

/// Newest first
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Presentation>> {
    let presentations = sqlx::query_as::<_, Presentation>(
        "SELECT * FROM presentations WHERE user_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(presentations)
}

pub async fn update_title(pool: &SqlitePool, id: i64, title: &str) -> Result<()> {
    sqlx::query("UPDATE presentations SET title = ?, updated_at = ? WHERE id = ?")
        .bind(title)
        .bind(now_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Set the status; returns false when the row no longer exists
pub async fn set_status(pool: &SqlitePool, id: i64, status: PresentationStatus) -> Result<bool> {
    let result = sqlx::query("UPDATE presentations SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(now_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a presentation; questions, answers and feedback cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM presentations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
