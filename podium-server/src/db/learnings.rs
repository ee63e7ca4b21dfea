//! Learning catalogue and progress persistence

use podium_common::time::now_rfc3339;
use podium_common::{Error, Result};
use sqlx::SqlitePool;

use crate::db::is_unique_violation;
use crate::models::{Learning, LearningProgress, LearningProgressStatus};

pub async fn list(pool: &SqlitePool) -> Result<Vec<Learning>> {
    let learnings = sqlx::query_as::<_, Learning>("SELECT * FROM learnings ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(learnings)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Learning>> {
    let learning = sqlx::query_as::<_, Learning>("SELECT * FROM learnings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(learning)
}

pub async fn list_progress(pool: &SqlitePool, user_id: i64) -> Result<Vec<LearningProgress>> {
    let progress = sqlx::query_as::<_, LearningProgress>(
        "SELECT * FROM learning_progress WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(progress)
}

/// Progress entry `id` if it belongs to `user_id`
pub async fn find_progress_owned(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<Option<LearningProgress>> {
    let progress = sqlx::query_as::<_, LearningProgress>(
        "SELECT * FROM learning_progress WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(progress)
}

/// Start a learning; starting the same learning twice is rejected
pub async fn start(pool: &SqlitePool, user_id: i64, learning_id: i64) -> Result<LearningProgress> {
    let now = now_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO learning_progress (user_id, learning_id, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(learning_id)
    .bind(LearningProgressStatus::Onprogress.as_str())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::InvalidInput("Learning already started".to_string())
        } else {
            Error::Database(e)
        }
    })?;

    find_progress_owned(pool, result.last_insert_rowid(), user_id)
        .await?
        .ok_or_else(|| Error::Internal("Learning progress vanished after insert".to_string()))
}

pub async fn complete(pool: &SqlitePool, id: i64, user_id: i64) -> Result<LearningProgress> {
    sqlx::query("UPDATE learning_progress SET status = ?, updated_at = ? WHERE id = ? AND user_id = ?")
        .bind(LearningProgressStatus::Completed.as_str())
        .bind(now_rfc3339())
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    find_progress_owned(pool, id, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("Learning progress not found".to_string()))
}
