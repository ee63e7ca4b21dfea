//! Questions and recorded answers

use axum::extract::Multipart;
use tracing::info;

use crate::analysis::MediaRef;
use crate::db;
use crate::db::answers::{NewAnswer, ALREADY_ANSWERED};
use crate::error::{ApiError, ApiResult};
use crate::models::{AnswerResponse, Question, QuestionResponse, RevealedQuestionResponse};
use crate::uploads::{upload_limit, UploadKind};
use crate::AppState;

const QUESTION_NOT_FOUND: &str = "Question not found";

async fn find_owned(state: &AppState, user_id: i64, question_id: i64) -> ApiResult<Question> {
    db::questions::find_owned(&state.db, question_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(QUESTION_NOT_FOUND.to_string()))
}

/// Original text of a question, with its answer if one exists
pub async fn reveal(
    state: &AppState,
    user_id: i64,
    question_id: i64,
) -> ApiResult<RevealedQuestionResponse> {
    let question = find_owned(state, user_id, question_id).await?;
    let answer = db::answers::find_by_question(&state.db, question_id)
        .await?
        .map(AnswerResponse::from);

    Ok(RevealedQuestionResponse {
        question: QuestionResponse::with_text(&question, question.question.clone()),
        answer,
    })
}

/// Store and grade an answer recording
///
/// Ownership and the one-answer rule are checked before the body is read,
/// so rejected requests never leave files behind.
pub async fn submit_answer(
    state: &AppState,
    user_id: i64,
    question_id: i64,
    multipart: Multipart,
) -> ApiResult<AnswerResponse> {
    let question = find_owned(state, user_id, question_id).await?;
    if question.is_answered {
        return Err(ApiError::BadRequest(ALREADY_ANSWERED.to_string()));
    }

    let max_bytes = upload_limit(&state.db, UploadKind::Audio).await;
    let form = state.media.read_form(multipart, UploadKind::Audio, max_bytes).await?;
    let upload = form
        .file
        .ok_or_else(|| ApiError::BadRequest(UploadKind::Audio.missing_message()))?;

    let media = MediaRef::new(upload.path.clone(), upload.mime_type.clone());
    let analysis = state.analyzer.analyze_answer(&media, &question.question).await;

    let new_answer = NewAnswer {
        question_id,
        audio_path: upload.path_string(),
        score: analysis.score,
        suggestion: analysis.suggestion,
        is_relevant: analysis.is_relevant,
    };

    match db::answers::create(&state.db, &new_answer).await {
        Ok(answer) => {
            info!(
                question_id,
                score = answer.score,
                is_fallback = analysis.is_fallback,
                "Answer stored"
            );
            Ok(answer.into())
        }
        Err(e) => {
            state.media.remove(&upload.path).await;
            Err(e.into())
        }
    }
}
