//! Avatar persistence

use podium_common::time::now_rfc3339;
use podium_common::{Error, Result};
use sqlx::SqlitePool;

use crate::models::Avatar;

pub async fn create(pool: &SqlitePool, image_path: &str, image_url: &str) -> Result<Avatar> {
    let now = now_rfc3339();
    let result = sqlx::query(
        "INSERT INTO avatars (image_path, image_url, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(image_path)
    .bind(image_url)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| Error::Internal("Avatar vanished after insert".to_string()))
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Avatar>> {
    let avatars = sqlx::query_as::<_, Avatar>("SELECT * FROM avatars ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(avatars)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Avatar>> {
    let avatar = sqlx::query_as::<_, Avatar>("SELECT * FROM avatars WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(avatar)
}

pub async fn update_image(
    pool: &SqlitePool,
    id: i64,
    image_path: &str,
    image_url: &str,
) -> Result<Avatar> {
    sqlx::query("UPDATE avatars SET image_path = ?, image_url = ?, updated_at = ? WHERE id = ?")
        .bind(image_path)
        .bind(image_url)
        .bind(now_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound("Avatar not found".to_string()))
}

/// Touch `updated_at` only
pub async fn touch(pool: &SqlitePool, id: i64) -> Result<Avatar> {
    sqlx::query("UPDATE avatars SET updated_at = ? WHERE id = ?")
        .bind(now_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound("Avatar not found".to_string()))
}

/// Delete an avatar; users referencing it fall back to no avatar
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM avatars WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
