//! Feedback persistence
//!
//! The analysis result and the final grade are each written in a single
//! transaction together with the presentation status change.

use podium_common::time::now_rfc3339;
use podium_common::{Error, Result};
use sqlx::SqlitePool;

use crate::models::{Feedback, PresentationStatus};

/// Video-derived part of a feedback row
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub expression: f64,
    pub intonation: f64,
    pub posture: f64,
    pub video_score: f64,
    pub video_rating: String,
    pub video_suggestion: String,
    pub is_fallback: bool,
}

/// Audio-derived part written by final feedback generation
#[derive(Debug, Clone, PartialEq)]
pub struct FinalScores {
    pub audio_score: f64,
    pub audio_suggestion: String,
    pub overall_score: i64,
    pub grade: String,
}

pub async fn find_by_presentation(pool: &SqlitePool, presentation_id: i64) -> Result<Option<Feedback>> {
    let feedback = sqlx::query_as::<_, Feedback>("SELECT * FROM feedback WHERE presentation_id = ?")
        .bind(presentation_id)
        .fetch_optional(pool)
        .await?;
    Ok(feedback)
}

/// Store an analysis: feedback row, questions, status `COMPLETED`
///
/// Fails (and writes nothing) if the presentation was deleted meanwhile.
pub async fn store_analysis(
    pool: &SqlitePool,
    presentation_id: i64,
    feedback: &NewFeedback,
    questions: &[String],
) -> Result<()> {
    let now = now_rfc3339();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO feedback (
            presentation_id, expression, intonation, posture, video_score,
            video_rating, video_suggestion, is_fallback, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(presentation_id)
    .bind(feedback.expression)
    .bind(feedback.intonation)
    .bind(feedback.posture)
    .bind(feedback.video_score)
    .bind(&feedback.video_rating)
    .bind(&feedback.video_suggestion)
    .bind(feedback.is_fallback)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    for question in questions {
        sqlx::query("INSERT INTO questions (presentation_id, question, created_at) VALUES (?, ?, ?)")
            .bind(presentation_id)
            .bind(question)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
    }

    let updated = sqlx::query("UPDATE presentations SET status = ?, updated_at = ? WHERE id = ?")
        .bind(PresentationStatus::Completed.as_str())
        .bind(&now)
        .bind(presentation_id)
        .execute(&mut *tx)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "Presentation {} no longer exists",
            presentation_id
        )));
    }

    tx.commit().await?;
    Ok(())
}

/// Write the final grade into the existing feedback row
pub async fn record_final(
    pool: &SqlitePool,
    presentation_id: i64,
    scores: &FinalScores,
) -> Result<Feedback> {
    let now = now_rfc3339();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE feedback
        SET audio_score = ?, audio_suggestion = ?, overall_score = ?, grade = ?, updated_at = ?
        WHERE presentation_id = ?
        "#,
    )
    .bind(scores.audio_score)
    .bind(&scores.audio_suggestion)
    .bind(scores.overall_score)
    .bind(&scores.grade)
    .bind(&now)
    .bind(presentation_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE presentations SET status = ?, updated_at = ? WHERE id = ?")
        .bind(PresentationStatus::Completed.as_str())
        .bind(&now)
        .bind(presentation_id)
        .execute(&mut *tx)
        .await?;

    let feedback = sqlx::query_as::<_, Feedback>("SELECT * FROM feedback WHERE presentation_id = ?")
        .bind(presentation_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(feedback)
}
