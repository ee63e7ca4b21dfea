//! User persistence

use podium_common::time::now_rfc3339;
use podium_common::{Error, Result};
use sqlx::SqlitePool;

use crate::db::is_unique_violation;
use crate::models::User;

const EMAIL_TAKEN: &str = "Email has already existed!";

/// Values for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_guest: bool,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub avatar_id: Option<i64>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// True if another account already uses `email`
pub async fn email_taken(pool: &SqlitePool, email: &str, except_id: Option<i64>) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ? AND id != ?")
        .bind(email)
        .bind(except_id.unwrap_or(0))
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Insert a user
///
/// A concurrent insert with the same email surfaces as `InvalidInput`.
pub async fn create(pool: &SqlitePool, new_user: &NewUser) -> Result<User> {
    let now = now_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, is_guest, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(new_user.is_guest)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::InvalidInput(EMAIL_TAKEN.to_string())
        } else {
            Error::Database(e)
        }
    })?;

    fetch(pool, result.last_insert_rowid()).await
}

/// Turn a guest account into a registered one, keeping its id
pub async fn upgrade_guest(pool: &SqlitePool, id: i64, new_user: &NewUser) -> Result<User> {
    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, password_hash = ?, is_guest = 0, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(now_rfc3339())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::InvalidInput(EMAIL_TAKEN.to_string())
        } else {
            Error::Database(e)
        }
    })?;

    fetch(pool, id).await
}

pub async fn update(pool: &SqlitePool, id: i64, changes: &UserChanges) -> Result<User> {
    sqlx::query(
        r#"
        UPDATE users
        SET username = COALESCE(?, username),
            email = COALESCE(?, email),
            password_hash = COALESCE(?, password_hash),
            avatar_id = COALESCE(?, avatar_id),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(changes.username.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.password_hash.as_deref())
    .bind(changes.avatar_id)
    .bind(now_rfc3339())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::InvalidInput(EMAIL_TAKEN.to_string())
        } else {
            Error::Database(e)
        }
    })?;

    fetch(pool, id).await
}

async fn fetch(pool: &SqlitePool, id: i64) -> Result<User> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}
