//! Answer persistence

use podium_common::time::now_rfc3339;
use podium_common::{Error, Result};
use sqlx::{FromRow, SqlitePool};

use crate::db::is_unique_violation;
use crate::models::Answer;

pub const ALREADY_ANSWERED: &str = "Question has already been answered";

/// Values for a new answer
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub question_id: i64,
    pub audio_path: String,
    pub score: f64,
    pub suggestion: String,
    pub is_relevant: bool,
}

/// Answer joined with the question it responds to
#[derive(Debug, Clone, FromRow)]
pub struct AnsweredQuestion {
    #[sqlx(flatten)]
    pub answer: Answer,
    pub question: String,
}

/// Insert an answer; a second answer for the same question is rejected
pub async fn create(pool: &SqlitePool, new_answer: &NewAnswer) -> Result<Answer> {
    let result = sqlx::query(
        r#"
        INSERT INTO answers (question_id, audio_path, score, suggestion, is_relevant, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new_answer.question_id)
    .bind(&new_answer.audio_path)
    .bind(new_answer.score)
    .bind(&new_answer.suggestion)
    .bind(new_answer.is_relevant)
    .bind(now_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::InvalidInput(ALREADY_ANSWERED.to_string())
        } else {
            Error::Database(e)
        }
    })?;

    let answer = sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;
    Ok(answer)
}

pub async fn find_by_question(pool: &SqlitePool, question_id: i64) -> Result<Option<Answer>> {
    let answer = sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE question_id = ?")
        .bind(question_id)
        .fetch_optional(pool)
        .await?;
    Ok(answer)
}

/// All answers of a presentation, in question order
pub async fn list_for_presentation(
    pool: &SqlitePool,
    presentation_id: i64,
) -> Result<Vec<AnsweredQuestion>> {
    let answers = sqlx::query_as::<_, AnsweredQuestion>(
        r#"
        SELECT a.id, a.question_id, a.audio_path, a.score, a.suggestion, a.is_relevant,
               a.created_at, q.question
        FROM answers a
        JOIN questions q ON q.id = a.question_id
        WHERE q.presentation_id = ?
        ORDER BY q.id
        "#,
    )
    .bind(presentation_id)
    .fetch_all(pool)
    .await?;
    Ok(answers)
}
