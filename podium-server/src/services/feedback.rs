//! Final grading

use tracing::info;

use crate::db;
use crate::db::feedback::FinalScores;
use crate::error::{ApiError, ApiResult};
use crate::grading::final_grade;
use crate::models::{FeedbackResponse, FinalFeedbackResponse};
use crate::services::presentations::find_owned;
use crate::uploads::public_url;
use crate::AppState;

pub const NO_AUDIO_SUGGESTION: &str = "No answers were recorded for this presentation.";

/// Combine the video feedback with every recorded answer
///
/// May be called repeatedly; each call recomputes from the current answers
/// and overwrites the stored grade.
pub async fn generate_final(
    state: &AppState,
    user_id: i64,
    presentation_id: i64,
) -> ApiResult<FinalFeedbackResponse> {
    find_owned(state, user_id, presentation_id).await?;

    let feedback = db::feedback::find_by_presentation(&state.db, presentation_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Video feedback not found. Analysis may not be ready yet.".to_string())
        })?;

    let answers = db::answers::list_for_presentation(&state.db, presentation_id).await?;
    let scores: Vec<f64> = answers.iter().map(|a| a.answer.score).collect();
    let result = final_grade(feedback.video_score, &scores);

    let audio_suggestion = if answers.is_empty() {
        NO_AUDIO_SUGGESTION.to_string()
    } else {
        answers
            .iter()
            .map(|a| a.answer.suggestion.as_str())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let updated = db::feedback::record_final(
        &state.db,
        presentation_id,
        &FinalScores {
            audio_score: result.audio_score,
            audio_suggestion: audio_suggestion.clone(),
            overall_score: result.overall_score,
            grade: result.grade.to_string(),
        },
    )
    .await?;

    info!(
        presentation_id,
        video_score = updated.video_score,
        audio_score = result.audio_score,
        overall_score = result.overall_score,
        grade = %result.grade,
        "Final feedback generated"
    );

    let first = answers.first();
    Ok(FinalFeedbackResponse {
        presentation_id,
        expression: updated.expression,
        intonation: updated.intonation,
        posture: updated.posture,
        video_score: updated.video_score,
        video_rating: updated.video_rating,
        audio_score: result.audio_score,
        overall_score: result.overall_score,
        grade: result.grade.to_string(),
        video_suggestion: updated.video_suggestion,
        audio_suggestion,
        answered_questions: answers.len(),
        question: first.map(|a| a.question.clone()),
        answer_audio_url: first.map(|a| public_url(&a.answer.audio_path)),
    })
}

pub async fn get(state: &AppState, user_id: i64, presentation_id: i64) -> ApiResult<FeedbackResponse> {
    find_owned(state, user_id, presentation_id).await?;

    db::feedback::find_by_presentation(&state.db, presentation_id)
        .await?
        .map(FeedbackResponse::from)
        .ok_or_else(|| ApiError::NotFound("Feedback not found".to_string()))
}
