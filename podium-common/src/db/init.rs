//! Database initialization
//!
//! Creates every table idempotently (`CREATE TABLE IF NOT EXISTS`), seeds
//! the learning catalogue on first run and makes sure every tunable setting
//! has a value.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Default values for tunable settings
///
/// Missing or NULL values are reset to these on startup.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("analysis_poll_interval_ms", "5000"),
    ("analysis_poll_timeout_ms", "300000"),
    ("max_video_upload_bytes", "104857600"), // 100 MB
    ("max_audio_upload_bytes", "26214400"),  // 25 MB
    ("max_image_upload_bytes", "5242880"),   // 5 MB
    ("db_max_lock_wait_ms", "5000"),
];

/// Open (or create) the database file and bring the schema up to date
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database with the full schema
///
/// A single connection is used because every `sqlite::memory:` connection
/// is a separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Create tables, seed data and default settings
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_avatars_table(pool).await?;
    create_users_table(pool).await?;
    create_presentations_table(pool).await?;
    create_questions_table(pool).await?;
    create_answers_table(pool).await?;
    create_feedback_table(pool).await?;
    create_learnings_table(pool).await?;
    create_learning_progress_table(pool).await?;

    crate::db::seed::seed_learnings(pool).await?;
    init_default_settings(pool).await?;

    Ok(())
}

/// Key-value store for tunable parameters
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_avatars_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS avatars (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            image_path TEXT NOT NULL,
            image_url TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            is_guest INTEGER NOT NULL DEFAULT 0,
            avatar_id INTEGER REFERENCES avatars(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_presentations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS presentations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            video_path TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'ONGOING'
                CHECK (status IN ('ONGOING', 'COMPLETED', 'FAILED')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_presentations_user ON presentations(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            presentation_id INTEGER NOT NULL REFERENCES presentations(id) ON DELETE CASCADE,
            question TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_questions_presentation ON questions(presentation_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_answers_table(pool: &SqlitePool) -> Result<()> {
    // UNIQUE(question_id): one answer per question
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER NOT NULL UNIQUE REFERENCES questions(id) ON DELETE CASCADE,
            audio_path TEXT NOT NULL,
            score REAL NOT NULL DEFAULT 0,
            suggestion TEXT NOT NULL DEFAULT '',
            is_relevant INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            CHECK (score >= 0 AND score <= 100)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_feedback_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            presentation_id INTEGER NOT NULL UNIQUE REFERENCES presentations(id) ON DELETE CASCADE,
            expression REAL NOT NULL,
            intonation REAL NOT NULL,
            posture REAL NOT NULL,
            video_score REAL NOT NULL,
            video_rating TEXT NOT NULL,
            video_suggestion TEXT NOT NULL,
            audio_score REAL,
            audio_suggestion TEXT,
            overall_score INTEGER,
            grade TEXT,
            is_fallback INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_learnings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS learnings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            video_url TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_learning_progress_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS learning_progress (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            learning_id INTEGER NOT NULL REFERENCES learnings(id) ON DELETE CASCADE,
            status TEXT NOT NULL DEFAULT 'ONPROGRESS'
                CHECK (status IN ('ONPROGRESS', 'COMPLETED')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, learning_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Ensure every default setting exists and is non-NULL
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    for (key, default_value) in DEFAULT_SETTINGS {
        ensure_setting(pool, key, default_value).await?;
    }
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let existing: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match existing {
        None => {
            // INSERT OR IGNORE: two processes may initialize concurrently
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;
            info!("Initialized setting '{}' with default value: {}", key, default_value);
        }
        Some(None) => {
            sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
                .bind(default_value)
                .bind(key)
                .execute(pool)
                .await?;
            warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
        }
        Some(Some(_)) => {}
    }

    Ok(())
}
