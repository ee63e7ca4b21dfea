//! Question lookups

use podium_common::Result;
use sqlx::SqlitePool;

use crate::models::Question;

const QUESTION_COLUMNS: &str = r#"
    q.id, q.presentation_id, q.question, q.created_at,
    EXISTS (SELECT 1 FROM answers a WHERE a.question_id = q.id) AS is_answered
"#;

/// Questions of a presentation in insertion order
pub async fn list_for_presentation(pool: &SqlitePool, presentation_id: i64) -> Result<Vec<Question>> {
    let sql = format!(
        "SELECT {} FROM questions q WHERE q.presentation_id = ? ORDER BY q.id",
        QUESTION_COLUMNS
    );
    let questions = sqlx::query_as::<_, Question>(&sql)
        .bind(presentation_id)
        .fetch_all(pool)
        .await?;
    Ok(questions)
}

/// Question `id` if its presentation belongs to `user_id`
pub async fn find_owned(pool: &SqlitePool, id: i64, user_id: i64) -> Result<Option<Question>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM questions q
        JOIN presentations p ON p.id = q.presentation_id
        WHERE q.id = ? AND p.user_id = ?
        "#,
        QUESTION_COLUMNS
    );
    let question = sqlx::query_as::<_, Question>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(question)
}
