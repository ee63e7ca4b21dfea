//! Tests for database initialization
//!
//! Covers automatic creation, idempotent re-open, default settings, the
//! learning seed and the referential rules enforced by the schema.

use podium_common::db::init::{init_database, init_memory_database, DEFAULT_SETTINGS};
use podium_common::db::seed::{seed_learnings, LEARNING_CATALOGUE};
use podium_common::time::now_rfc3339;
use sqlx::SqlitePool;

async fn insert_user(pool: &SqlitePool, email: &str) -> i64 {
    let now = now_rfc3339();
    sqlx::query(
        "INSERT INTO users (username, email, password_hash, is_guest, created_at, updated_at)
         VALUES ('speaker', ?, 'hash', 0, ?, ?)",
    )
    .bind(email)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

async fn insert_presentation(pool: &SqlitePool, user_id: i64) -> i64 {
    let now = now_rfc3339();
    sqlx::query(
        "INSERT INTO presentations (user_id, title, video_path, status, created_at, updated_at)
         VALUES (?, 'Quarterly review', '/tmp/video.mp4', 'ONGOING', ?, ?)",
    )
    .bind(user_id)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("podium.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing_without_reseeding() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("podium.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM learnings")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count as usize, LEARNING_CATALOGUE.len());
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let pool = init_memory_database().await.unwrap();

    for (key, default_value) in DEFAULT_SETTINGS {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some(*default_value), "setting {}", key);
    }
}

#[tokio::test]
async fn test_null_setting_reset_on_schema_refresh() {
    let pool = init_memory_database().await.unwrap();
    sqlx::query("UPDATE settings SET value = NULL WHERE key = 'analysis_poll_interval_ms'")
        .execute(&pool)
        .await
        .unwrap();

    podium_common::db::create_schema(&pool).await.unwrap();

    let value: String = sqlx::query_scalar(
        "SELECT value FROM settings WHERE key = 'analysis_poll_interval_ms'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(value, "5000");
}

#[tokio::test]
async fn test_seed_runs_once() {
    let pool = init_memory_database().await.unwrap();
    assert_eq!(seed_learnings(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_email_rejected_by_schema() {
    let pool = init_memory_database().await.unwrap();
    insert_user(&pool, "dup@example.com").await;

    let now = now_rfc3339();
    let second = sqlx::query(
        "INSERT INTO users (username, email, password_hash, created_at, updated_at)
         VALUES ('other', 'dup@example.com', 'hash', ?, ?)",
    )
    .bind(&now)
    .bind(&now)
    .execute(&pool)
    .await;
    assert!(second.is_err());
}

#[tokio::test]
async fn test_presentation_delete_cascades() {
    let pool = init_memory_database().await.unwrap();
    let user_id = insert_user(&pool, "cascade@example.com").await;
    let presentation_id = insert_presentation(&pool, user_id).await;
    let now = now_rfc3339();

    let question_id = sqlx::query(
        "INSERT INTO questions (presentation_id, question, created_at) VALUES (?, 'Why?', ?)",
    )
    .bind(presentation_id)
    .bind(&now)
    .execute(&pool)
    .await
    .unwrap()
    .last_insert_rowid();

    sqlx::query(
        "INSERT INTO answers (question_id, audio_path, score, suggestion, is_relevant, created_at)
         VALUES (?, '/tmp/a.mp3', 70, 'ok', 1, ?)",
    )
    .bind(question_id)
    .bind(&now)
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO feedback (presentation_id, expression, intonation, posture, video_score,
                               video_rating, video_suggestion, created_at, updated_at)
         VALUES (?, 80, 70, 60, 70, 'B', 'fine', ?, ?)",
    )
    .bind(presentation_id)
    .bind(&now)
    .bind(&now)
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM presentations WHERE id = ?")
        .bind(presentation_id)
        .execute(&pool)
        .await
        .unwrap();

    for table in ["questions", "answers", "feedback"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "{} rows survived the cascade", table);
    }
}

#[tokio::test]
async fn test_second_answer_for_question_rejected() {
    let pool = init_memory_database().await.unwrap();
    let user_id = insert_user(&pool, "answer@example.com").await;
    let presentation_id = insert_presentation(&pool, user_id).await;
    let now = now_rfc3339();

    let question_id = sqlx::query(
        "INSERT INTO questions (presentation_id, question, created_at) VALUES (?, 'How?', ?)",
    )
    .bind(presentation_id)
    .bind(&now)
    .execute(&pool)
    .await
    .unwrap()
    .last_insert_rowid();

    let insert = || {
        sqlx::query(
            "INSERT INTO answers (question_id, audio_path, created_at) VALUES (?, '/tmp/a.mp3', ?)",
        )
        .bind(question_id)
        .bind(now.clone())
        .execute(&pool)
    };

    assert!(insert().await.is_ok());
    assert!(insert().await.is_err());
}

#[tokio::test]
async fn test_invalid_presentation_status_rejected() {
    let pool = init_memory_database().await.unwrap();
    let user_id = insert_user(&pool, "status@example.com").await;
    let presentation_id = insert_presentation(&pool, user_id).await;

    let result = sqlx::query("UPDATE presentations SET status = 'PAUSED' WHERE id = ?")
        .bind(presentation_id)
        .execute(&pool)
        .await;
    assert!(result.is_err());
}
